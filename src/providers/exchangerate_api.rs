use {
    super::{
        new_http_client, non_empty, FetchOutcome, ProviderKind, ProviderRejection, ProviderTable,
        RateProvider,
    },
    crate::{
        env::RatesConfig,
        error::{ProxyError, ProxyResult},
    },
    async_trait::async_trait,
    serde::Deserialize,
    serde_json::json,
    std::collections::HashMap,
};

const DEFAULT_API_URL: &str = "https://v6.exchangerate-api.com/v6";

const UNSUPPORTED_CODE: &str = "unsupported-code";
const PLAN_UPGRADE_REQUIRED: &str = "plan-upgrade-required";

/// ExchangeRate-API family: the credential lives in the path and success is
/// signalled by `result == "success"`. No server-side symbol narrowing; the
/// normalizer filters after the fact.
#[derive(Debug)]
pub struct ExchangeRateApiProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(config: &RatesConfig) -> ProxyResult<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            base_api_url: config
                .base_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            http_client: new_http_client(config.timeout_secs)?,
        })
    }

    fn endpoint(&self, tail: &str) -> String {
        format!(
            "{}/{}/{tail}",
            self.base_api_url,
            self.api_key.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    conversion_rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: Option<String>,
    conversion_rate: Option<f64>,
}

fn rejection(error_type: Option<String>) -> ProviderRejection {
    ProviderRejection {
        code: None,
        kind: error_type.clone(),
        detail: json!({ "error-type": error_type }),
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::ExchangeRateApi
    }

    fn has_credential(&self) -> bool {
        non_empty(self.api_key.as_deref()).is_some()
    }

    #[tracing::instrument(skip(self), fields(provider = %self.provider_kind()), level = "debug")]
    async fn latest(&self, base: &str, _symbols: Option<&[String]>) -> ProxyResult<FetchOutcome> {
        let url = self.endpoint(&format!("latest/{base}"));
        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return match response.json::<LatestResponse>().await {
                Ok(body) => Ok(FetchOutcome::Rejected(rejection(body.error_type))),
                Err(_) => Err(ProxyError::UpstreamUnreachable(format!(
                    "Provider returned HTTP {status}"
                ))),
            };
        }

        let body = response.json::<LatestResponse>().await?;
        if body.result.as_deref() == Some("success") {
            let rates = body.conversion_rates.ok_or_else(|| {
                ProxyError::MalformedPayload("success response without conversion_rates".to_string())
            })?;
            return Ok(FetchOutcome::Table(ProviderTable {
                base: body.base_code.unwrap_or_else(|| base.to_string()),
                date: None,
                timestamp: body.time_last_update_unix,
                rates,
            }));
        }
        Ok(FetchOutcome::Rejected(rejection(body.error_type)))
    }

    fn fixed_base(&self) -> Option<&'static str> {
        Some("USD")
    }

    fn is_restricted_base(&self, rejection: &ProviderRejection) -> bool {
        rejection.kind.as_deref() == Some(UNSUPPORTED_CODE)
    }

    fn is_pair_only(&self, rejection: &ProviderRejection) -> bool {
        rejection.kind.as_deref() == Some(PLAN_UPGRADE_REQUIRED)
    }

    #[tracing::instrument(skip(self), fields(provider = %self.provider_kind()), level = "debug")]
    async fn convert(&self, from: &str, to: &str) -> ProxyResult<Option<f64>> {
        let url = self.endpoint(&format!("pair/{from}/{to}"));
        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // A rejected pair (unknown code) is omitted, not fatal.
            return match response.json::<PairResponse>().await {
                Ok(_) => Ok(None),
                Err(_) => Err(ProxyError::UpstreamUnreachable(format!(
                    "Provider returned HTTP {status}"
                ))),
            };
        }

        let body = response.json::<PairResponse>().await?;
        if body.result.as_deref() == Some("success") {
            return Ok(body.conversion_rate);
        }
        Ok(None)
    }
}
