//! ペイロードバージョン2.0（HTTP API）の変換

use std::collections::HashMap;

use bytes::Bytes;
use http::header::HeaderMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::utils::{append_header, decode_body, take_host};
use crate::common::{Body, Config, GatewayContext, GatewayRequest};
use crate::error::Error;
use super::serde_ext::de_null_as_default;
use super::{parse_method, IntoGatewayRequest};

/// HTTP APIのリクエスト（v2.0）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestV2 {
    #[serde(deserialize_with = "de_null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub route_key: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub raw_path: String,
    /// エンコード済みのクエリ文字列（`?` を含まない）
    #[serde(deserialize_with = "de_null_as_default")]
    pub raw_query_string: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub cookies: Vec<String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub request_context: RequestContextV2,
    #[serde(deserialize_with = "de_null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub is_base64_encoded: bool,
    #[serde(deserialize_with = "de_null_as_default")]
    pub stage_variables: HashMap<String, String>,
}

/// リクエストコンテキスト（v2.0）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContextV2 {
    #[serde(deserialize_with = "de_null_as_default")]
    pub account_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub api_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub domain_name: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub domain_prefix: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub http: RequestContextHttp,
    #[serde(deserialize_with = "de_null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub route_id: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub route_key: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub stage: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub time: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub time_epoch: i64,
}

/// requestContext.http
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContextHttp {
    #[serde(deserialize_with = "de_null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub protocol: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub source_ip: String,
    #[serde(deserialize_with = "de_null_as_default")]
    pub user_agent: String,
}

impl RequestV2 {
    /// rawPath と rawQueryString からリクエストURIを構築（クエリは再エンコードしない）
    pub fn request_uri(&self) -> String {
        if self.raw_query_string.is_empty() {
            self.raw_path.clone()
        } else {
            format!("{}?{}", self.raw_path, self.raw_query_string)
        }
    }
}

impl IntoGatewayRequest for RequestV2 {
    fn into_gateway_request(self, config: &Config) -> Result<GatewayRequest, Error> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.headers {
            append_header(&mut headers, key, value);
        }
        let host = take_host(&mut headers);
        let request_uri = self.request_uri();

        let body = decode_body(&self.body, self.is_base64_encoded, config.max_body_size())?;
        let content_length = body.len() as u64;

        let http = self.request_context.http;
        debug!(
            "Converted v2 event: {} {} ({} bytes)",
            http.method, request_uri, content_length
        );

        let context = GatewayContext {
            request_id: self.request_context.request_id,
            stage: self.request_context.stage,
            route_key: self.route_key,
            path_parameters: self.path_parameters,
            stage_variables: self.stage_variables,
        };

        let mut request = GatewayRequest::new(parse_method(&http.method), request_uri);
        request.proto = http.protocol;
        request.headers = headers;
        request.content_length = content_length;
        request.body = Body::new(Bytes::from(body));
        request.remote_addr = http.source_ip;
        request.host = host;
        Ok(request.with_context(context))
    }
}
