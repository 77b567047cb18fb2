//! 正規化されたHTTPリクエスト型

use std::fmt;
use std::io::{self, Read};

use bytes::{Buf, Bytes};
use http::header::HeaderMap;
use http::{Method, Uri, Version};
use percent_encoding::percent_decode_str;
use serde::Deserialize;

use crate::error::Error;
use super::context::GatewayContext;
use super::utils::parse_query_pairs;

/// 一度だけ読み出せるリクエストボディ
pub struct Body {
    reader: bytes::buf::Reader<Bytes>,
}

impl Body {
    /// バイト列からボディを作成
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            reader: bytes.into().reader(),
        }
    }

    /// 空のボディ
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// 未読の残りバイト数
    pub fn remaining(&self) -> usize {
        self.reader.get_ref().remaining()
    }

    /// 未読部分をまとめて取り出す
    pub fn into_bytes(self) -> Bytes {
        self.reader.into_inner()
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body(<{} bytes>)", self.remaining())
    }
}

/// リクエストURIのパース結果（パスとエンコード済みクエリ）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestUrl {
    /// パス部分（パーセントエンコードはそのまま）
    pub path: String,
    /// `?` 以降のエンコード済みクエリ（`?` を含まない）
    pub raw_query: String,
}

impl RequestUrl {
    /// URIをベストエフォートでパースする（失敗しない）
    ///
    /// 正しいURIであれば `http::Uri` の解釈に従い、そうでなければ最初の `?` で
    /// パスとクエリに分割する。フラグメントは捨てる。
    pub fn parse(uri: &str) -> Self {
        if let Ok(parsed) = uri.parse::<Uri>() {
            if parsed.scheme().is_none() && uri.starts_with('/') {
                return Self {
                    path: parsed.path().to_string(),
                    raw_query: parsed.query().unwrap_or_default().to_string(),
                };
            }
        }

        let without_fragment = uri.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                raw_query: query.to_string(),
            },
            None => Self {
                path: without_fragment.to_string(),
                raw_query: String::new(),
            },
        }
    }

    /// パーセントデコードしたパス
    ///
    /// `+` は空白にしない。不正なエスケープや非UTF-8のバイト列はそのまま / 置換文字で残す。
    pub fn decoded_path(&self) -> String {
        percent_decode_str(&self.path)
            .decode_utf8_lossy()
            .into_owned()
    }

    /// クエリをデコードしたキーと値の組（出現順）
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        parse_query_pairs(&self.raw_query)
    }

    /// 最初に現れたクエリ値を取得
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// ゲートウェイイベントから構築される正規化済みHTTPリクエスト
///
/// 変換呼び出しごとに新しく作られ、所有権（ボディを含む）は呼び出し元に移る。
#[derive(Debug)]
pub struct GatewayRequest {
    /// HTTPメソッド
    pub method: Method,
    /// プロトコル文字列（例: "HTTP/1.1"）
    pub proto: String,
    /// HTTPヘッダー（Hostは含まない）
    pub headers: HeaderMap,
    /// デコード後のボディ長（バイト）
    pub content_length: u64,
    /// リクエストボディ
    pub body: Body,
    /// クライアントのアドレス
    pub remote_addr: String,
    /// Hostヘッダーの値
    pub host: String,
    /// パスとエンコード済みクエリ
    pub request_uri: String,
    /// request_uriのパース結果
    pub url: RequestUrl,
    /// ゲートウェイ固有の付随情報
    context: GatewayContext,
}

impl GatewayRequest {
    /// 新しいリクエストを作成（プロトコルは HTTP/1.1）
    pub fn new(method: Method, request_uri: impl Into<String>) -> Self {
        let request_uri = request_uri.into();
        Self {
            method,
            proto: "HTTP/1.1".to_string(),
            headers: HeaderMap::new(),
            content_length: 0,
            body: Body::empty(),
            remote_addr: String::new(),
            host: String::new(),
            url: RequestUrl::parse(&request_uri),
            request_uri,
            context: GatewayContext::default(),
        }
    }

    /// プロトコル文字列から `http::Version` を取得（不明ならNone）
    pub fn version(&self) -> Option<Version> {
        match self.proto.as_str() {
            "HTTP/0.9" => Some(Version::HTTP_09),
            "HTTP/1.0" => Some(Version::HTTP_10),
            "HTTP/1.1" => Some(Version::HTTP_11),
            "HTTP/2" | "HTTP/2.0" => Some(Version::HTTP_2),
            "HTTP/3" | "HTTP/3.0" => Some(Version::HTTP_3),
            _ => None,
        }
    }

    /// ヘッダーの先頭値を文字列で取得
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// パス部分
    pub fn path(&self) -> &str {
        &self.url.path
    }

    /// ボディをバイト列として読み出す（ボディは消費される）
    pub fn take_body(&mut self) -> Bytes {
        std::mem::take(&mut self.body).into_bytes()
    }

    /// ボディをJSONとしてパース（ボディは消費される）
    pub fn json<T: for<'de> Deserialize<'de>>(&mut self) -> Result<T, Error> {
        let body = self.take_body();
        Ok(serde_json::from_slice(&body)?)
    }

    /// ゲートウェイコンテキストの不変参照を取得
    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    /// ゲートウェイコンテキストの可変参照を取得
    pub fn context_mut(&mut self) -> &mut GatewayContext {
        &mut self.context
    }

    /// ゲートウェイコンテキストを設定
    pub fn with_context(mut self, context: GatewayContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_body_is_one_shot() {
        let mut body = Body::new(b"hello".to_vec());
        assert_eq!(body.remaining(), 5);

        let mut buf = String::new();
        body.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hello");
        assert_eq!(body.remaining(), 0);

        let mut again = Vec::new();
        assert_eq!(body.read_to_end(&mut again).unwrap(), 0);
        assert!(body.into_bytes().is_empty());
    }

    #[test]
    fn test_body_partial_read() {
        let mut body = Body::new(Bytes::from_static(b"abcdef"));
        let mut buf = [0u8; 2];
        body.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ab");
        assert_eq!(body.into_bytes(), Bytes::from_static(b"cdef"));
    }

    #[test]
    fn test_request_url_parse() {
        let url = RequestUrl::parse("/hello?a=1&b=two%20words");
        assert_eq!(url.path, "/hello");
        assert_eq!(url.raw_query, "a=1&b=two%20words");
        assert_eq!(url.query_value("b"), Some("two words".to_string()));
        assert_eq!(url.query_value("c"), None);

        let url = RequestUrl::parse("/plain");
        assert_eq!(url.path, "/plain");
        assert_eq!(url.raw_query, "");
    }

    #[test]
    fn test_request_url_decoded_path() {
        let url = RequestUrl::parse("/a%20b/c%2Fd?x=1");
        assert_eq!(url.path, "/a%20b/c%2Fd");
        assert_eq!(url.decoded_path(), "/a b/c/d");

        let url = RequestUrl::parse("/%E3%81%82+x/%zz");
        assert_eq!(url.decoded_path(), "/あ+x/%zz");
    }

    #[test]
    fn test_request_url_parse_is_lenient() {
        // 不正なURIでもエラーにはならない
        let url = RequestUrl::parse("/bad path?q={x}");
        assert_eq!(url.path, "/bad path");
        assert_eq!(url.raw_query, "q={x}");

        let url = RequestUrl::parse("");
        assert_eq!(url, RequestUrl::default());

        let url = RequestUrl::parse("no-slash?x=1#frag");
        assert_eq!(url.path, "no-slash");
        assert_eq!(url.raw_query, "x=1");
    }

    #[test]
    fn test_version_from_proto() {
        let mut req = GatewayRequest::new(Method::GET, "/");
        assert_eq!(req.version(), Some(Version::HTTP_11));

        req.proto = "HTTP/2.0".to_string();
        assert_eq!(req.version(), Some(Version::HTTP_2));

        req.proto = String::new();
        assert_eq!(req.version(), None);
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_request_json() {
        let mut req = GatewayRequest::new(Method::POST, "/test");
        req.body = Body::new(br#"{"name":"test","value":42}"#.to_vec());

        let parsed: TestData = req.json().unwrap();
        assert_eq!(
            parsed,
            TestData {
                name: "test".to_string(),
                value: 42
            }
        );

        // ボディは消費済み
        assert!(req.json::<TestData>().is_err());
    }
}
