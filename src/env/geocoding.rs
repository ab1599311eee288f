use serde::Deserialize;
use serde_piecewise_default::DeserializePiecewiseDefault;

#[derive(DeserializePiecewiseDefault, Debug, Clone)]
pub struct GeocodingConfig {
    pub google_key: Option<String>,
    pub base_api_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        GeocodingConfig {
            google_key: None,
            base_api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            timeout_secs: 5,
        }
    }
}
