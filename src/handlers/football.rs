use {
    crate::{error::ProxyError, state::AppState},
    axum::{
        extract::{Query, State},
        response::{IntoResponse, Response},
        Json,
    },
    serde::Deserialize,
    serde_json::{json, Value},
    std::sync::Arc,
    tap::TapFallible,
    tracing::error,
};

#[derive(Debug, Deserialize, Clone)]
pub struct TeamsQueryParams {
    pub league: Option<String>,
    pub season: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaguesQueryParams {
    pub country: Option<String>,
}

pub async fn countries_handler(State(state): State<Arc<AppState>>) -> Result<Response, ProxyError> {
    let body = state
        .providers
        .api_sports_provider
        .countries()
        .await
        .tap_err(|e| error!("Failed to fetch countries: {e}"))?;
    Ok(Json(body).into_response())
}

pub async fn teams_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TeamsQueryParams>,
) -> Result<Response, ProxyError> {
    let body = state
        .providers
        .api_sports_provider
        .teams(params.league.as_deref(), params.season.as_deref())
        .await
        .tap_err(|e| error!("Failed to fetch teams: {e}"))?;
    Ok(Json(body).into_response())
}

pub async fn competitions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ProxyError> {
    let body = state
        .providers
        .football_data_provider
        .competitions()
        .await
        .tap_err(|e| error!("Failed to fetch competitions: {e}"))?;
    Ok(Json(body).into_response())
}

/// Competitions catalogue narrowed by country and reshaped into the
/// `{get, results, response}` envelope the client consumes elsewhere.
pub async fn leagues_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaguesQueryParams>,
) -> Result<Response, ProxyError> {
    let body = state
        .providers
        .football_data_provider
        .competitions()
        .await
        .tap_err(|e| error!("Failed to fetch leagues: {e}"))?;

    Ok(Json(reshape_leagues(body, params.country.as_deref())).into_response())
}

fn reshape_leagues(body: Value, country: Option<&str>) -> Value {
    let competitions = body
        .get("competitions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let filtered: Vec<Value> = match country {
        Some(country) => competitions
            .into_iter()
            .filter(|competition| area_matches(competition, country))
            .collect(),
        None => competitions,
    };

    json!({
        "get": "leagues",
        "results": filtered.len(),
        "response": filtered,
    })
}

fn area_matches(competition: &Value, country: &str) -> bool {
    let area = &competition["area"];
    [area["name"].as_str(), area["code"].as_str()]
        .into_iter()
        .flatten()
        .any(|value| value.eq_ignore_ascii_case(country))
}
