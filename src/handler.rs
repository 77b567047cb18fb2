//! ハンドラートレイトとイベント呼び出しのエントリーポイント

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use log::{error, info};

use crate::common::{Config, GatewayRequest};
use crate::error::Error;
use crate::event::{decode_event, IntoGatewayRequest, PayloadVersion};
use crate::response::{ProxyResponse, Response};

/// ハンドラーの特性
#[async_trait]
pub trait Handler: Send + Sync {
    /// リクエストを処理
    async fn handle(&self, req: GatewayRequest) -> Result<Response, Error>;
}

/// 非同期関数をHandlerとして扱うラッパー
pub struct FnHandler<F, Fut> {
    func: F,
    _marker: PhantomData<fn() -> Fut>,
}

/// 非同期関数・クロージャからHandlerを作成
pub fn from_fn<F, Fut>(func: F) -> FnHandler<F, Fut>
where
    F: Fn(GatewayRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    FnHandler {
        func,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F, Fut>
where
    F: Fn(GatewayRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn handle(&self, req: GatewayRequest) -> Result<Response, Error> {
        (self.func)(req).await
    }
}

/// イベントを受け取ってハンドラーを呼び出し、ゲートウェイ向けレスポンスを返す
pub struct Invoker<H> {
    handler: H,
    config: Config,
}

impl<H: Handler> Invoker<H> {
    /// 新しいInvokerを作成
    pub fn new(handler: H, config: Config) -> Self {
        Self { handler, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 生のイベントJSONを処理する
    ///
    /// 変換エラー・ハンドラーエラーは固定メッセージのエラーレスポンスになる。
    pub async fn invoke(&self, event: &[u8]) -> ProxyResponse {
        let decoded = match decode_event(event, &self.config) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!("Request conversion error: {}", e);
                // バージョンが判定できなかった場合はv1形式で返す（v2のゲートウェイも解釈できる）
                return Response::from_error(&e).into_proxy_response(PayloadVersion::V1);
            }
        };
        let version = decoded.version();

        let req = match decoded.into_gateway_request(&self.config) {
            Ok(req) => req,
            Err(e) => {
                error!("Request conversion error: {}", e);
                return Response::from_error(&e).into_proxy_response(version);
            }
        };
        info!("Received request: {} {}", req.method, req.request_uri);

        let response = match self.handler.handle(req).await {
            Ok(res) => res,
            Err(e) => {
                error!("Handler error: {}", e);
                Response::from_error(&e)
            }
        };

        response.into_proxy_response(version)
    }
}
