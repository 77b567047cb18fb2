//! 共通ユーティリティ関数群（ヘッダー構築、クエリのエンコード/解析、ボディのデコード）

use std::collections::BTreeMap;

use http::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use log::warn;
use url::form_urlencoded;

use crate::error::Error;

/// クエリパラメータの値マップ（キー順にソート、値は追加順）
pub type QueryValues = BTreeMap<String, Vec<String>>;

/// ヘッダーを追加する（同じキーの既存値は保持）
///
/// ヘッダー名・値として不正なもの（CRLF・制御文字を含む等）はログに出して読み飛ばす。
pub fn append_header(headers: &mut HeaderMap, key: &str, value: &str) {
    let name = match HeaderName::from_bytes(key.as_bytes()) {
        Ok(name) => name,
        Err(_) => {
            warn!("Dropping header with invalid name: {:?}", key);
            return;
        }
    };
    match HeaderValue::from_bytes(value.as_bytes()) {
        Ok(value) => {
            headers.append(name, value);
        }
        Err(_) => {
            warn!("Dropping header with invalid value: {}", name);
        }
    }
}

/// Hostヘッダーを取り出して削除する（大文字小文字は区別しない）
///
/// 複数値の場合は先頭の値を返し、全ての値を削除する。存在しなければ空文字。
pub fn take_host(headers: &mut HeaderMap) -> String {
    headers
        .remove(HOST)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// クエリ値マップに値を追加
pub fn add_query_value(values: &mut QueryValues, key: &str, value: &str) {
    values
        .entry(key.to_string())
        .or_default()
        .push(value.to_string());
}

/// クエリ値マップを正規形（キー順、パーセントエスケープ）にエンコード
pub fn encode_query(values: &QueryValues) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, vs) in values {
        for v in vs {
            serializer.append_pair(key, v);
        }
    }
    serializer.finish()
}

/// クエリ文字列をパースしてURLデコードする（重複キーは出現順に保持）
pub fn parse_query_pairs(query_string: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query_string.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// イベントのボディ文字列をバイト列にデコードする
///
/// `is_base64_encoded` が真ならBase64としてデコードし、失敗はエラーとする（生テキスト扱いにはしない）。
/// 標準アルファベットでパディング必須。改行（`\r` / `\n`）は読み飛ばし、末尾の余りビットは許容する。
///
/// `max_body_size` が指定されている場合はデコード後のサイズで上限を検査する。
/// Base64の場合はデコード前に入力長からの見積りでも検査するため、上限を大きく超える入力は
/// Base64として不正であっても `InvalidBody` ではなく `PayloadTooLarge` になる。
pub fn decode_body(
    body: &str,
    is_base64_encoded: bool,
    max_body_size: Option<usize>,
) -> Result<Vec<u8>, Error> {
    if !is_base64_encoded {
        check_body_size(body.len(), max_body_size)?;
        return Ok(body.as_bytes().to_vec());
    }

    let encoded: Vec<u8> = body
        .bytes()
        .filter(|b| *b != b'\r' && *b != b'\n')
        .collect();

    if let Some(limit) = max_body_size {
        // 入力長から概算のデコード後サイズを見積り（4文字→3バイト、端数切り上げ）
        let estimated_decoded = ((encoded.len() + 3) / 4).saturating_mul(3);
        // パディング分を考慮して2バイトまでは許容し、正確な判定はデコード後に行う
        if estimated_decoded > limit.saturating_add(2) {
            warn!(
                "Base64 body too large: estimated {} bytes (limit {})",
                estimated_decoded, limit
            );
            return Err(Error::PayloadTooLarge(format!(
                "Body too large (>{} bytes)",
                limit
            )));
        }
    }

    // パディング無しの入力は受け付けない
    if encoded.len() % 4 != 0 {
        warn!("Base64 decode error: length {} is not padded", encoded.len());
        return Err(Error::InvalidBody(base64::DecodeError::InvalidLength));
    }

    let config = base64::STANDARD.decode_allow_trailing_bits(true);
    let bytes = base64::decode_config(&encoded, config).map_err(|e| {
        warn!("Base64 decode error: {}", e);
        Error::InvalidBody(e)
    })?;
    check_body_size(bytes.len(), max_body_size)?;
    Ok(bytes)
}

fn check_body_size(len: usize, max_body_size: Option<usize>) -> Result<(), Error> {
    match max_body_size {
        Some(limit) if len > limit => {
            warn!("Body too large: {} bytes (limit {})", len, limit);
            Err(Error::PayloadTooLarge(format!(
                "Body too large (>{} bytes)",
                limit
            )))
        }
        _ => Ok(()),
    }
}
