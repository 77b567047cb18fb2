//! gwbridge: API Gatewayのプロキシイベントを正規化されたHTTPリクエストに変換するライブラリ
//!
//! ペイロードバージョン1.0と2.0の両方を受け付け、どちらの形式でも同じ
//! [`GatewayRequest`] としてハンドラーに渡せるようにする。
//!
//! ```no_run
//! use gwbridge::{convert, Config};
//!
//! let event = br#"{"version":"2.0","rawPath":"/x","rawQueryString":"b=2"}"#;
//! let req = convert(event, &Config::from_env()).unwrap();
//! assert_eq!(req.request_uri, "/x?b=2");
//! ```

pub mod common;
pub mod error;
pub mod event;
pub mod handler;
pub mod response;

#[cfg(feature = "lambda")]
pub mod lambda;

pub use common::{Body, Config, GatewayContext, GatewayRequest, RequestUrl};
pub use error::Error;
pub use event::{
    convert, decode_event, detect_version, GatewayEvent, IntoGatewayRequest, PayloadVersion,
    RequestV1, RequestV2,
};
pub use handler::{from_fn, Handler, Invoker};
pub use response::{ProxyResponse, Response};
