use {
    crate::{env::Config, error::ProxyResult, providers::new_provider_repository},
    anyhow::Context,
    axum::{http, routing::get, Router},
    std::{net::SocketAddr, sync::Arc},
    tower::ServiceBuilder,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    },
    tracing::{info, Level},
};

pub mod env;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod rates;
pub mod state;

pub async fn bootstrap(config: Config) -> ProxyResult<()> {
    let providers = new_provider_repository(&config)?;

    let port = config.server.port;
    let host = config.server.host.clone();

    let state_arc = Arc::new(state::new_state(config, providers));
    let app = router(state_arc);

    info!("Running fg-proxy v{} on port {port}", env!("CARGO_PKG_VERSION"));
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|_| {
            error::ProxyError::InvalidConfiguration(format!("Invalid socket address {host}:{port}"))
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind the server socket")?;
    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}

pub fn router(state_arc: Arc<state::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([http::Method::GET, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE]);

    let global_middleware = ServiceBuilder::new().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new())
            .on_request(DefaultOnRequest::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Router::new()
        .route("/v1/rates", get(handlers::rates::handler))
        .route(
            "/v1/football/countries",
            get(handlers::football::countries_handler),
        )
        .route(
            "/v1/football/leagues",
            get(handlers::football::leagues_handler),
        )
        .route("/v1/football/teams", get(handlers::football::teams_handler))
        .route(
            "/v1/football/competitions",
            get(handlers::football::competitions_handler),
        )
        .route("/v1/geocode", get(handlers::geocode::geocode_handler))
        .route("/v1/revgeocode", get(handlers::geocode::revgeocode_handler))
        .route("/health", get(handlers::health::handler))
        .layer(cors)
        .layer(global_middleware)
        .with_state(state_arc)
}
