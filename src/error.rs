//! エラー型の定義

use thiserror::Error;

/// アプリケーションのエラー型
#[derive(Error, Debug)]
pub enum Error {
    /// イベントJSONのデコードエラー（メッセージはそのまま呼び出し元へ）
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// 未対応のペイロードバージョン
    #[error("Payload Version {0} is not supported")]
    UnsupportedPayloadVersion(String),

    /// Base64ボディのデコードエラー
    #[error("Invalid base64-encoded request body: {0}")]
    InvalidBody(#[from] base64::DecodeError),

    /// ボディサイズ超過
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// ハンドラーエラー
    #[error("Handler error: {0}")]
    HandlerError(String),

    /// レスポンスのシリアライズエラー
    #[error("Failed to serialize response: {0}")]
    ResponseSerializationError(String),
}

impl Error {
    /// エラーからHTTPステータスコードを取得
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Decode(_) => 400,
            Error::InvalidBody(_) => 400,
            Error::PayloadTooLarge(_) => 413,
            Error::UnsupportedPayloadVersion(_) => 500,
            Error::HandlerError(_) => 500,
            Error::ResponseSerializationError(_) => 500,
        }
    }
}
