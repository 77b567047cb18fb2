//! ペイロードバージョン1.0（REST API / HTTP API v1 互換）の変換

use std::collections::HashMap;

use bytes::Bytes;
use http::header::HeaderMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::utils::{add_query_value, append_header, decode_body, encode_query, take_host};
use crate::common::{Body, Config, GatewayContext, GatewayRequest, QueryValues};
use crate::error::Error;
use super::serde_ext::de_null_as_default;
use super::{parse_method, IntoGatewayRequest};

/// API Gatewayプロキシ統合のリクエスト（v1.0）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestV1 {
    #[serde(deserialize_with = "de_null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub resource: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub stage_variables: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub request_context: RequestContextV1,
    #[serde(deserialize_with = "de_null_as_default")]
    pub is_base64_encoded: bool,
}

/// リクエストコンテキスト（v1.0）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContextV1 {
    #[serde(deserialize_with = "de_null_as_default")]
    pub account_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub api_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub http_method: String,
    /// 呼び出し元の情報。値はnullやオブジェクトの場合もあるためJSON値のまま保持
    #[serde(deserialize_with = "de_null_as_default")]
    pub identity: HashMap<String, Value>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub resource_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub resource_path: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub stage: String,
}

impl RequestContextV1 {
    /// identity.sourceIp（存在しなければ空文字）
    pub fn source_ip(&self) -> &str {
        self.identity
            .get("sourceIp")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl RequestV1 {
    /// ヘッダーを構築（multiValueHeadersが空でなければそちらを優先）
    fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.multi_value_headers.is_empty() {
            for (key, values) in &self.multi_value_headers {
                for value in values {
                    append_header(&mut headers, key, value);
                }
            }
        } else {
            for (key, value) in &self.headers {
                append_header(&mut headers, key, value);
            }
        }
        headers
    }

    /// クエリ値を構築（multiValueQueryStringParametersが空でなければそちらを優先）
    fn query_values(&self) -> QueryValues {
        let mut values = QueryValues::new();
        if !self.multi_value_query_string_parameters.is_empty() {
            for (key, vs) in &self.multi_value_query_string_parameters {
                for v in vs {
                    add_query_value(&mut values, key, v);
                }
            }
        } else {
            for (key, v) in &self.query_string_parameters {
                add_query_value(&mut values, key, v);
            }
        }
        values
    }

    /// パスとクエリからリクエストURIを構築
    ///
    /// クエリを付けるかどうかは単一値の queryStringParameters の有無で決まる。
    /// multiValueQueryStringParameters だけが入ったイベントではクエリは付かない。
    pub fn request_uri(&self) -> String {
        if self.query_string_parameters.is_empty() {
            return self.path.clone();
        }
        format!("{}?{}", self.path, encode_query(&self.query_values()))
    }
}

impl IntoGatewayRequest for RequestV1 {
    fn into_gateway_request(self, config: &Config) -> Result<GatewayRequest, Error> {
        let mut headers = self.header_map();
        let host = take_host(&mut headers);
        let request_uri = self.request_uri();

        let body = decode_body(&self.body, self.is_base64_encoded, config.max_body_size())?;
        let content_length = body.len() as u64;

        debug!(
            "Converted v1 event: {} {} ({} bytes)",
            self.http_method, request_uri, content_length
        );

        let context = GatewayContext {
            request_id: self.request_context.request_id.clone(),
            stage: self.request_context.stage.clone(),
            route_key: self.resource,
            path_parameters: self.path_parameters,
            stage_variables: self.stage_variables,
        };

        let mut request = GatewayRequest::new(parse_method(&self.http_method), request_uri);
        request.proto = "HTTP/1.1".to_string();
        request.headers = headers;
        request.content_length = content_length;
        request.body = Body::new(Bytes::from(body));
        request.remote_addr = self.request_context.source_ip().to_string();
        request.host = host;
        Ok(request.with_context(context))
    }
}
