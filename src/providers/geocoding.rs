use {
    super::{new_http_client, non_empty},
    crate::{
        env::GeocodingConfig,
        error::{ProxyError, ProxyResult},
    },
    serde::{Deserialize, Serialize},
    serde_json::json,
    url::Url,
};

/// Google geocoding, forward and reverse, reshaped down to the coordinates
/// and country of the top hit.
#[derive(Debug)]
pub struct GeocodingProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    status: Option<String>,
    #[serde(default)]
    results: Vec<GoogleGeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeHit {
    geometry: Option<GoogleGeometry>,
    #[serde(default)]
    address_components: Vec<GoogleAddressComponent>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: Option<GoogleLocation>,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleAddressComponent {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodingProvider {
    pub fn new(config: &GeocodingConfig) -> ProxyResult<Self> {
        Ok(Self {
            api_key: config.google_key.clone(),
            base_api_url: config.base_api_url.clone(),
            http_client: new_http_client(config.timeout_secs)?,
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn geocode(&self, address: &str) -> ProxyResult<GeocodeResult> {
        self.lookup(&[("address", address)], "geocode_failed").await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, lat: &str, lng: &str) -> ProxyResult<GeocodeResult> {
        self.lookup(&[("latlng", &format!("{lat},{lng}"))], "revgeocode_failed")
            .await
    }

    async fn lookup(&self, params: &[(&str, &str)], failure_tag: &str) -> ProxyResult<GeocodeResult> {
        let api_key = non_empty(self.api_key.as_deref()).ok_or(ProxyError::MissingCredential)?;

        let mut url = Url::parse(&self.base_api_url)
            .map_err(|e| ProxyError::InvalidConfiguration(format!("Invalid API url: {e}")))?;
        for (name, value) in params {
            url.query_pairs_mut().append_pair(name, value);
        }
        url.query_pairs_mut().append_pair("key", api_key);

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamUnreachable(format!(
                "Provider returned HTTP {status}"
            )));
        }

        let raw = response.json::<serde_json::Value>().await?;
        let parsed: GoogleGeocodeResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ProxyError::MalformedPayload(e.to_string()))?;

        let upstream_status = parsed.status.unwrap_or_else(|| "UNKNOWN".to_string());
        if upstream_status != "OK" || parsed.results.is_empty() {
            return Err(ProxyError::ProviderRejected(json!({
                "error": format!("{failure_tag}:{upstream_status}"),
                "raw": raw,
            })));
        }

        Ok(reshape(&parsed.results[0]))
    }
}

fn reshape(hit: &GoogleGeocodeHit) -> GeocodeResult {
    let location = hit.geometry.as_ref().and_then(|g| g.location.as_ref());
    let country = hit
        .address_components
        .iter()
        .find(|component| component.types.iter().any(|t| t == "country"));

    GeocodeResult {
        lat: location.map(|l| l.lat),
        lng: location.map(|l| l.lng),
        country_code: country.and_then(|c| c.short_name.clone()),
        country_name: country.and_then(|c| c.long_name.clone()),
    }
}
