//! AWS Lambda向けの実装

use std::sync::Arc;

use lambda_runtime::{run as run_runtime, service_fn, Error as LambdaError, LambdaEvent};
use log::info;
use serde_json::Value;

use crate::common::Config;
use crate::handler::{Handler, Invoker};
use crate::response::ProxyResponse;

/// Lambda関数のハンドラー
async fn lambda_handler<H: Handler>(
    invoker: &Invoker<H>,
    event: LambdaEvent<Value>,
) -> Result<ProxyResponse, LambdaError> {
    let (payload, context) = event.into_parts();
    info!("Invocation {}", context.request_id);

    // バージョン判定はイベントJSONそのものに対して行う
    let raw = serde_json::to_vec(&payload)?;
    Ok(invoker.invoke(&raw).await)
}

/// ハンドラーをLambda関数として実行
pub async fn run<H>(handler: H, config: Config) -> Result<(), LambdaError>
where
    H: Handler + 'static,
{
    info!("Starting Lambda handler");

    let invoker = Arc::new(Invoker::new(handler, config));

    // サービス関数の定義
    let handler_func = service_fn(move |event: LambdaEvent<Value>| {
        let invoker = invoker.clone();
        async move { lambda_handler(&invoker, event).await }
    });

    // Lambda実行ランタイムの起動
    run_runtime(handler_func).await?;

    Ok(())
}
