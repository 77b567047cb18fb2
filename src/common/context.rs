//! ゲートウェイコンテキストの実装

use std::collections::HashMap;

/// ゲートウェイイベントから引き継ぐ付随情報
///
/// 変換規則には関与せず、ハンドラーからの参照用にだけ保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayContext {
    /// ゲートウェイが採番したリクエストID
    pub request_id: String,
    /// ステージ名
    pub stage: String,
    /// ルートキー（v1ではリソースパス）
    pub route_key: String,
    /// パスパラメータ
    pub path_parameters: HashMap<String, String>,
    /// ステージ変数
    pub stage_variables: HashMap<String, String>,
}

impl GatewayContext {
    /// 新しいGatewayContextを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// パスパラメータを取得
    pub fn path_parameter(&self, key: &str) -> Option<&str> {
        self.path_parameters.get(key).map(String::as_str)
    }

    /// ステージ変数を取得
    pub fn stage_variable(&self, key: &str) -> Option<&str> {
        self.stage_variables.get(key).map(String::as_str)
    }
}
