use {
    super::with_cache_control,
    crate::{
        error::ProxyError,
        rates::{self, RateQuery},
        state::AppState,
    },
    axum::{
        extract::{Query, State},
        response::{IntoResponse, Response},
        Json,
    },
    serde::Deserialize,
    std::sync::Arc,
    tap::TapFallible,
    tracing::error,
};

const CACHE_CONTROL_VALUE: &str = "s-maxage=3600, stale-while-revalidate";

#[derive(Debug, Deserialize, Clone)]
pub struct RatesQueryParams {
    pub base: Option<String>,
    pub symbols: Option<String>,
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RatesQueryParams>,
) -> Result<Response, ProxyError> {
    let query = RateQuery::from_params(params.base, params.symbols)?;
    let table = rates::normalize(state.providers.rate_provider.as_ref(), &query)
        .await
        .tap_err(|e| error!("Failed to normalize rates for base {}: {e}", query.base))?;

    Ok(with_cache_control(
        Json(table).into_response(),
        CACHE_CONTROL_VALUE,
    ))
}
