use crate::providers::ProviderKind;
use serde::Deserialize;
use serde_piecewise_default::DeserializePiecewiseDefault;

#[derive(DeserializePiecewiseDefault, Debug, Clone)]
pub struct RatesConfig {
    /// Which upstream rate family the normalizer talks to.
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    /// Override of the provider's default API root, used by tests.
    pub base_api_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            provider: ProviderKind::Fixer,
            api_key: None,
            base_api_url: None,
            timeout_secs: 5,
        }
    }
}
