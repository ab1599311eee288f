use axum::{
    http::{header::CACHE_CONTROL, HeaderValue},
    response::Response,
};

pub mod football;
pub mod geocode;
pub mod health;
pub mod rates;

pub(crate) fn with_cache_control(mut response: Response, value: &'static str) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(value));
    response
}
