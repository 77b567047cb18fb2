//! ハンドラーのレスポンスと、ゲートウェイ向けレスポンスJSONへの変換

use std::collections::BTreeMap;

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use serde::{Deserialize, Serialize};

use crate::common::utils::append_header;
use crate::error::Error;
use crate::event::PayloadVersion;

/// HTTPレスポンス
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// HTTPステータスコード
    pub status: u16,
    /// HTTPヘッダー（同名ヘッダーの複数値を保持）
    pub headers: HeaderMap,
    /// Set-Cookieとして返すクッキー
    pub cookies: Vec<String>,
    /// レスポンスボディ
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// 新しいレスポンスを作成
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// 200 OKレスポンスを作成
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// ヘッダーを追加（不正な名前・値は無視）
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        append_header(&mut self.headers, key, value);
        self
    }

    /// クッキーを追加
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }

    /// ボディを追加
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// テキストボディを設定
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Some(text.into().into_bytes());
        self
    }

    /// JSONをボディとして設定
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value)
            .map_err(|e| Error::ResponseSerializationError(e.to_string()))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(json);
        Ok(self)
    }

    /// Error型から固定メッセージのレスポンスを生成（内部情報は含めない）
    pub fn from_error(error: &Error) -> Self {
        let status = error.status_code();
        let message = match status {
            400 => "Bad Request",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        };
        Response::new(status).text(message)
    }

    /// ペイロードバージョンに応じたゲートウェイ向けレスポンスに変換
    pub fn into_proxy_response(self, version: PayloadVersion) -> ProxyResponse {
        // テキストとして解釈できなければBase64エンコード
        let (body, is_base64_encoded) = match self.body {
            Some(body) => match String::from_utf8(body) {
                Ok(text) => (text, false),
                Err(e) => (base64::encode(e.as_bytes()), true),
            },
            None => (String::new(), false),
        };

        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in self.headers.iter() {
            grouped
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        match version {
            PayloadVersion::V1 => {
                // v1のレスポンスにはcookiesが無いのでSet-Cookieヘッダーとして返す
                if !self.cookies.is_empty() {
                    grouped
                        .entry(SET_COOKIE.as_str().to_string())
                        .or_default()
                        .extend(self.cookies);
                }
                let headers = grouped
                    .iter()
                    .filter_map(|(k, vs)| vs.first().map(|v| (k.clone(), v.clone())))
                    .collect();
                ProxyResponse {
                    status_code: self.status,
                    headers,
                    multi_value_headers: grouped,
                    cookies: Vec::new(),
                    body,
                    is_base64_encoded,
                }
            }
            PayloadVersion::V2 => {
                let headers = grouped
                    .into_iter()
                    .map(|(k, vs)| (k, vs.join(", ")))
                    .collect();
                ProxyResponse {
                    status_code: self.status,
                    headers,
                    multi_value_headers: BTreeMap::new(),
                    cookies: self.cookies,
                    body,
                    is_base64_encoded,
                }
            }
        }
    }
}

/// ゲートウェイに返すプロキシレスポンス
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_text_body_v1() {
        let res = Response::ok()
            .with_header("X-Custom", "a")
            .with_header("x-custom", "b")
            .text("hello")
            .into_proxy_response(PayloadVersion::V1);

        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, "hello");
        assert!(!res.is_base64_encoded);
        assert_eq!(res.headers.get("x-custom"), Some(&"a".to_string()));
        assert_eq!(
            res.multi_value_headers.get("x-custom"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            res.headers.get("content-type"),
            Some(&"text/plain; charset=utf-8".to_string())
        );
    }

    #[test]
    fn test_headers_joined_v2() {
        let res = Response::ok()
            .with_header("X-Custom", "a")
            .with_header("X-Custom", "b")
            .into_proxy_response(PayloadVersion::V2);

        assert_eq!(res.headers.get("x-custom"), Some(&"a, b".to_string()));
        assert!(res.multi_value_headers.is_empty());
    }

    #[test]
    fn test_binary_body_is_base64() {
        let res = Response::ok()
            .with_body(vec![0xff, 0xfe, 0x00])
            .into_proxy_response(PayloadVersion::V2);

        assert!(res.is_base64_encoded);
        assert_eq!(base64::decode(&res.body).unwrap(), vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn test_cookies_by_version() {
        let v2 = Response::ok()
            .with_cookie("a=1")
            .with_cookie("b=2")
            .into_proxy_response(PayloadVersion::V2);
        assert_eq!(v2.cookies, vec!["a=1".to_string(), "b=2".to_string()]);
        assert!(v2.headers.get("set-cookie").is_none());

        let v1 = Response::ok()
            .with_cookie("a=1")
            .with_cookie("b=2")
            .into_proxy_response(PayloadVersion::V1);
        assert!(v1.cookies.is_empty());
        assert_eq!(
            v1.multi_value_headers.get("set-cookie"),
            Some(&vec!["a=1".to_string(), "b=2".to_string()])
        );
    }

    #[test]
    fn test_json_response() {
        let res = Response::ok()
            .json(&TestData {
                name: "test".to_string(),
                value: 42,
            })
            .unwrap()
            .into_proxy_response(PayloadVersion::V2);

        assert_eq!(res.body, r#"{"name":"test","value":42}"#);
        assert_eq!(
            res.headers.get("content-type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_from_error_hides_details() {
        let err = Error::HandlerError("secret detail".to_string());
        let res = Response::from_error(&err).into_proxy_response(PayloadVersion::V1);
        assert_eq!(res.status_code, 500);
        assert_eq!(res.body, "Internal Server Error");
        assert!(!res.body.contains("secret"));

        let err = Error::PayloadTooLarge("exceeds".to_string());
        let res = Response::from_error(&err).into_proxy_response(PayloadVersion::V1);
        assert_eq!(res.status_code, 413);
        assert_eq!(res.body, "Payload Too Large");
    }

    #[test]
    fn test_proxy_response_serialization() {
        let res = Response::new(204).into_proxy_response(PayloadVersion::V2);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "statusCode": 204,
                "headers": {},
                "body": "",
                "isBase64Encoded": false
            })
        );
    }
}
