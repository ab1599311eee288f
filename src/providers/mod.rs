use {
    crate::{
        env::Config,
        error::{ProxyError, ProxyResult},
    },
    async_trait::async_trait,
    serde::Deserialize,
    std::{collections::HashMap, fmt::Display, sync::Arc, time::Duration},
};

mod api_sports;
mod currencylayer;
mod exchangerate_api;
mod fixer;
mod football_data;
mod geocoding;

pub use {
    api_sports::ApiSportsProvider,
    currencylayer::CurrencylayerProvider,
    exchangerate_api::ExchangeRateApiProvider,
    fixer::FixerProvider,
    football_data::FootballDataProvider,
    geocoding::{GeocodeResult, GeocodingProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Fixer,
    ExchangeRateApi,
    Currencylayer,
    ApiSports,
    FootballData,
    GoogleGeocoding,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            ProviderKind::Fixer => "Fixer",
            ProviderKind::ExchangeRateApi => "ExchangeRate-API",
            ProviderKind::Currencylayer => "currencylayer",
            ProviderKind::ApiSports => "api-sports",
            ProviderKind::FootballData => "football-data.org",
            ProviderKind::GoogleGeocoding => "Google Geocoding",
        })
    }
}

/// Raw-normalized result of one upstream rates call. `date`/`timestamp` stay
/// optional here; the normalizer fills the canonical defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTable {
    pub base: String,
    pub date: Option<String>,
    pub timestamp: Option<i64>,
    pub rates: HashMap<String, f64>,
}

/// A provider-level rejection: the upstream answered with an interpretable
/// error body instead of a rate table.
#[derive(Debug, Clone)]
pub struct ProviderRejection {
    pub code: Option<i64>,
    pub kind: Option<String>,
    pub detail: serde_json::Value,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Table(ProviderTable),
    Rejected(ProviderRejection),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    fn provider_kind(&self) -> ProviderKind;

    fn has_credential(&self) -> bool;

    /// Latest table for `base`, narrowed to `symbols` where the upstream
    /// supports server-side narrowing.
    async fn latest(&self, base: &str, symbols: Option<&[String]>) -> ProxyResult<FetchOutcome>;

    /// The only base the provider serves when the requested one is
    /// plan-restricted.
    fn fixed_base(&self) -> Option<&'static str> {
        None
    }

    fn is_restricted_base(&self, rejection: &ProviderRejection) -> bool {
        let _ = rejection;
        false
    }

    fn is_pair_only(&self, rejection: &ProviderRejection) -> bool {
        let _ = rejection;
        false
    }

    /// Single pair conversion. `Ok(None)` means the provider does not serve
    /// this pair.
    async fn convert(&self, from: &str, to: &str) -> ProxyResult<Option<f64>> {
        let _ = (from, to);
        Ok(None)
    }
}

pub struct ProviderRepository {
    pub rate_provider: Arc<dyn RateProvider>,
    pub api_sports_provider: ApiSportsProvider,
    pub football_data_provider: FootballDataProvider,
    pub geocoding_provider: GeocodingProvider,
}

pub fn new_provider_repository(config: &Config) -> ProxyResult<ProviderRepository> {
    let rate_provider: Arc<dyn RateProvider> = match config.rates.provider {
        ProviderKind::Fixer => Arc::new(FixerProvider::new(&config.rates)?),
        ProviderKind::ExchangeRateApi => Arc::new(ExchangeRateApiProvider::new(&config.rates)?),
        ProviderKind::Currencylayer => Arc::new(CurrencylayerProvider::new(&config.rates)?),
        kind => {
            return Err(ProxyError::InvalidConfiguration(format!(
                "{kind} is not a rate provider family"
            )))
        }
    };

    Ok(ProviderRepository {
        rate_provider,
        api_sports_provider: ApiSportsProvider::new(&config.football)?,
        football_data_provider: FootballDataProvider::new(&config.football)?,
        geocoding_provider: GeocodingProvider::new(&config.geocoding)?,
    })
}

pub(crate) fn new_http_client(timeout_secs: u64) -> ProxyResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProxyError::InvalidConfiguration(format!("Failed to build HTTP client: {e}")))
}

pub(crate) fn non_empty(credential: Option<&str>) -> Option<&str> {
    credential.filter(|value| !value.is_empty())
}
