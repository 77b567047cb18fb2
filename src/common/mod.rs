//! 共通の型とユーティリティ

pub mod config;
pub mod context;
pub mod http;
pub mod utils;

pub use config::Config;
pub use context::GatewayContext;
pub use self::http::{Body, GatewayRequest, RequestUrl};
pub use utils::{decode_body, encode_query, parse_query_pairs, QueryValues};
