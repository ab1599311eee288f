use {
    dotenv::dotenv,
    fg_proxy::{env::Config, error},
    std::str::FromStr,
    tracing_subscriber::fmt::format::FmtSpan,
};

#[tokio::main]
async fn main() -> error::ProxyResult<()> {
    dotenv().ok();

    let config = Config::from_env()
        .expect("Failed to load config, please ensure all env vars are defined.");

    tracing_subscriber::fmt()
        .with_max_level(
            tracing::Level::from_str(config.server.log_level.as_str()).expect("Invalid log level"),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .init();

    fg_proxy::bootstrap(config).await
}
