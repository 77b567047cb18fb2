//! ゲートウェイイベントのバージョン判定と正規化リクエストへの変換
//!
//! 生のイベントJSONからペイロードバージョン（"1.0" / "2.0"）を判定し、
//! バージョンごとのスキーマでデコードしてから [`GatewayRequest`] を構築する。

pub mod serde_ext;
pub mod v1;
pub mod v2;

use std::fmt;

use http::Method;
use log::{debug, warn};
use serde::Deserialize;

use crate::common::{Config, GatewayRequest};
use crate::error::Error;
use serde_ext::de_null_as_default;

pub use v1::{RequestContextV1, RequestV1};
pub use v2::{RequestContextHttp, RequestContextV2, RequestV2};

/// ペイロードバージョン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadVersion {
    V1,
    V2,
}

impl PayloadVersion {
    /// 判別子の文字列からバージョンを決定
    ///
    /// 空文字と "1.0" はv1、"2.0" はv2。それ以外はエラー。
    pub fn parse(version: &str) -> Result<Self, Error> {
        match version {
            "" | "1.0" => Ok(PayloadVersion::V1),
            "2.0" => Ok(PayloadVersion::V2),
            other => Err(Error::UnsupportedPayloadVersion(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadVersion::V1 => "1.0",
            PayloadVersion::V2 => "2.0",
        }
    }
}

impl fmt::Display for PayloadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// イベントから正規化リクエストへの変換
pub trait IntoGatewayRequest {
    /// 正規化リクエストに変換（ボディのデコード失敗はエラー）
    fn into_gateway_request(self, config: &Config) -> Result<GatewayRequest, Error>;
}

/// バージョンごとにデコード済みのイベント
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    V1(Box<RequestV1>),
    V2(Box<RequestV2>),
}

impl GatewayEvent {
    pub fn version(&self) -> PayloadVersion {
        match self {
            GatewayEvent::V1(_) => PayloadVersion::V1,
            GatewayEvent::V2(_) => PayloadVersion::V2,
        }
    }
}

impl IntoGatewayRequest for GatewayEvent {
    fn into_gateway_request(self, config: &Config) -> Result<GatewayRequest, Error> {
        match self {
            GatewayEvent::V1(event) => (*event).into_gateway_request(config),
            GatewayEvent::V2(event) => (*event).into_gateway_request(config),
        }
    }
}

/// 判別子だけを読むためのプローブ
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default, deserialize_with = "de_null_as_default")]
    version: String,
}

/// ペイロードバージョンを判定する
///
/// 設定でバージョンが固定されていればイベントを読まずにその値を使う。
pub fn detect_version(event: &[u8], config: &Config) -> Result<PayloadVersion, Error> {
    if let Some(version) = config.payload_version() {
        debug!("Using configured payload version: {}", version);
        return PayloadVersion::parse(version);
    }
    let probe: VersionProbe = serde_json::from_slice(event)?;
    PayloadVersion::parse(&probe.version)
}

/// バージョンを判定し、対応するスキーマでイベント全体をデコードする
pub fn decode_event(event: &[u8], config: &Config) -> Result<GatewayEvent, Error> {
    let version = detect_version(event, config)?;
    debug!("Decoding gateway event as payload version {}", version);
    let decoded = match version {
        PayloadVersion::V1 => GatewayEvent::V1(Box::new(serde_json::from_slice(event)?)),
        PayloadVersion::V2 => GatewayEvent::V2(Box::new(serde_json::from_slice(event)?)),
    };
    Ok(decoded)
}

/// 生のイベントJSONを正規化リクエストに変換する
pub fn convert(event: &[u8], config: &Config) -> Result<GatewayRequest, Error> {
    decode_event(event, config)?.into_gateway_request(config)
}

/// メソッド文字列の変換（空や不正なトークンはGETにフォールバック）
///
/// 空文字はdebug、不正なトークンはwarnでログを出す。
fn parse_method(method: &str) -> Method {
    if method.is_empty() {
        debug!("HTTP method is empty, fallback to GET");
        return Method::GET;
    }
    match Method::from_bytes(method.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("Invalid HTTP method: {:?}, fallback to GET", method);
            Method::GET
        }
    }
}
