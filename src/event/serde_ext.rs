//! ゲートウェイイベント用のserde補助関数
//!
//! ゲートウェイは値が無いフィールドに明示的な `null` を送ってくることがある
//! （`"body": null`、`"multiValueHeaders": null` など）。`#[serde(default)]` と組み合わせて、
//! そうしたフィールドをエラーにせず空の値としてデコードする。

use serde::{Deserialize, Deserializer};

/// `null` をデフォルト値として読む
pub fn de_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct T {
        #[serde(default, deserialize_with = "de_null_as_default")]
        s: String,
        #[serde(default, deserialize_with = "de_null_as_default")]
        m: HashMap<String, String>,
        #[serde(default, deserialize_with = "de_null_as_default")]
        b: bool,
    }

    #[test]
    fn null_and_missing_become_default() {
        let t: T = serde_json::from_str(r#"{"s":null,"m":null}"#).unwrap();
        assert_eq!(t.s, "");
        assert!(t.m.is_empty());
        assert!(!t.b);
    }

    #[test]
    fn present_values_are_kept() {
        let t: T = serde_json::from_str(r#"{"s":"x","m":{"k":"v"},"b":true}"#).unwrap();
        assert_eq!(t.s, "x");
        assert_eq!(t.m.get("k").map(String::as_str), Some("v"));
        assert!(t.b);
    }

    #[test]
    fn wrong_type_still_fails() {
        assert!(serde_json::from_str::<T>(r#"{"s":1}"#).is_err());
    }
}
