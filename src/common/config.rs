//! 変換処理の設定（ペイロードバージョンの固定、ボディサイズ上限）

use std::env;

/// ペイロードバージョンを固定する環境変数
pub const PAYLOAD_VERSION_ENV: &str = "GWBRIDGE_PAYLOAD_VERSION";

/// デコード後ボディの最大サイズを指定する環境変数
pub const MAX_BODY_SIZE_ENV: &str = "GWBRIDGE_MAX_BODY_SIZE";

/// 変換設定
///
/// プロセス起動時に一度だけ構築し、以降は読み取り専用として各変換呼び出しに渡す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// 設定されている場合は自動判定をスキップしてこの値を使う（検証は変換時）
    payload_version: Option<String>,
    /// デコード後ボディの上限（バイト）。Noneなら無制限
    max_body_size: Option<usize>,
}

impl Config {
    /// 自動判定・無制限のデフォルト設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から設定を読み込む
    /// 優先順位: 環境変数 -> デフォルト（自動判定、無制限）
    pub fn from_env() -> Self {
        let payload_version = env::var(PAYLOAD_VERSION_ENV)
            .ok()
            .filter(|v| !v.is_empty());
        let max_body_size = env::var(MAX_BODY_SIZE_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok());
        Self {
            payload_version,
            max_body_size,
        }
    }

    /// ペイロードバージョンを固定（空文字は自動判定扱い）
    pub fn with_payload_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.payload_version = if version.is_empty() { None } else { Some(version) };
        self
    }

    /// ボディサイズ上限を設定
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = Some(bytes);
        self
    }

    pub fn payload_version(&self) -> Option<&str> {
        self.payload_version.as_deref()
    }

    pub fn max_body_size(&self) -> Option<usize> {
        self.max_body_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::with_vars;

    #[test]
    fn test_from_env_defaults() {
        with_vars(
            [
                (PAYLOAD_VERSION_ENV, None::<&str>),
                (MAX_BODY_SIZE_ENV, None::<&str>),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.payload_version(), None);
                assert_eq!(config.max_body_size(), None);
                assert_eq!(config, Config::new());
            },
        );
    }

    #[test]
    fn test_from_env_custom() {
        with_vars(
            [
                (PAYLOAD_VERSION_ENV, Some("2.0")),
                (MAX_BODY_SIZE_ENV, Some("1048576")), // 1MB
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.payload_version(), Some("2.0"));
                assert_eq!(config.max_body_size(), Some(1048576));
            },
        );
    }

    #[test]
    fn test_from_env_empty_and_invalid() {
        with_vars(
            [
                (PAYLOAD_VERSION_ENV, Some("")),
                (MAX_BODY_SIZE_ENV, Some("lots")),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.payload_version(), None);
                assert_eq!(config.max_body_size(), None);
            },
        );
    }

    #[test]
    fn test_builder() {
        let config = Config::new().with_payload_version("1.0").with_max_body_size(10);
        assert_eq!(config.payload_version(), Some("1.0"));
        assert_eq!(config.max_body_size(), Some(10));

        // 未対応の値もそのまま保持し、変換時に検証する
        let config = Config::new().with_payload_version("3.0");
        assert_eq!(config.payload_version(), Some("3.0"));

        let config = config.with_payload_version("");
        assert_eq!(config.payload_version(), None);
    }
}
