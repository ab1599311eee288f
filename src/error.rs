use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

pub type ProxyResult<T> = Result<T, ProxyError>;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    EnvyError(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing provider credential")]
    MissingCredential,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    #[error("Provider rejected the request")]
    ProviderRejected(serde_json::Value),

    #[error("{0:?}")]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so query-string credentials never reach logs or
        // response bodies.
        let err = err.without_url();
        if err.is_decode() {
            Self::MalformedPayload(err.to_string())
        } else {
            Self::UpstreamUnreachable(err.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidQuery(description) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": description })),
            )
                .into_response(),
            Self::ProviderRejected(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Provider rejected the request",
                    "details": details,
                })),
            )
                .into_response(),
            Self::UpstreamUnreachable(description) => {
                error!("Upstream unreachable: {description}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Failed to reach the upstream provider" })),
                )
                    .into_response()
            }
            Self::MalformedPayload(description) => {
                error!("Malformed upstream payload: {description}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Upstream provider returned an unexpected payload" })),
                )
                    .into_response()
            }
            Self::MissingCredential => {
                error!("Provider credential is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Missing provider credential" })),
                )
                    .into_response()
            }
            e => {
                error!("HTTP server error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
