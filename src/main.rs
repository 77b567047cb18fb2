use log::info;
use serde::Serialize;

use gwbridge::{Config, Error, GatewayRequest, Response};

#[derive(Serialize)]
struct Echo {
    method: String,
    host: String,
    request_uri: String,
    remote_addr: String,
    content_length: u64,
    body: String,
}

// リクエストの内容をそのまま返すサンプルハンドラー
async fn echo_handler(mut req: GatewayRequest) -> Result<Response, Error> {
    let body = req.take_body();
    let echo = Echo {
        method: req.method.to_string(),
        host: req.host.clone(),
        request_uri: req.request_uri.clone(),
        remote_addr: req.remote_addr.clone(),
        content_length: req.content_length,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    Response::ok().json(&echo)
}

#[tokio::main]
async fn main() {
    // ロガーの初期化
    env_logger::init();

    let config = Config::from_env();
    info!(
        "Starting gwbridge (payload version: {})",
        config.payload_version().unwrap_or("auto")
    );

    #[cfg(feature = "lambda")]
    {
        info!("Running as AWS Lambda");
        if let Err(e) = gwbridge::lambda::run(gwbridge::from_fn(echo_handler), config).await {
            eprintln!("Lambda error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "lambda"))]
    {
        let _ = (config, echo_handler);
        println!("Please enable the 'lambda' feature to run the application.");
        println!("Example: cargo run --features lambda");
        std::process::exit(1);
    }
}
