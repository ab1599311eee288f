use {
    super::with_cache_control,
    crate::{error::ProxyError, state::AppState},
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

// 30 days
const CACHE_CONTROL_VALUE: &str = "public, max-age=2592000";

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodeQueryParams {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RevGeocodeQueryParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

pub async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQueryParams>,
) -> Result<Response, ProxyError> {
    let address = params
        .address
        .filter(|address| !address.trim().is_empty())
        .ok_or_else(|| ProxyError::InvalidQuery("address required".to_string()))?;

    let result = state
        .providers
        .geocoding_provider
        .geocode(&address)
        .await
        .tap_err(|e| error!("Failed to geocode address: {e}"))?;

    Ok(with_cache_control(
        Json(result).into_response(),
        CACHE_CONTROL_VALUE,
    ))
}

pub async fn revgeocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RevGeocodeQueryParams>,
) -> Result<Response, ProxyError> {
    let (lat, lng) = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) if !lat.trim().is_empty() && !lng.trim().is_empty() => (lat, lng),
        _ => return Err(ProxyError::InvalidQuery("lat & lng required".to_string())),
    };

    let result = state
        .providers
        .geocoding_provider
        .reverse(&lat, &lng)
        .await
        .tap_err(|e| error!("Failed to reverse-geocode coordinates: {e}"))?;

    Ok(with_cache_control(
        Json(result).into_response(),
        CACHE_CONTROL_VALUE,
    ))
}
