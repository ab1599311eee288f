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
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
    url::Url,
};

const DEFAULT_API_URL: &str = "https://data.fixer.io/api";

// The free plan pins the base to EUR and rejects everything else with this
// code ("base_currency_access_restricted").
const BASE_RESTRICTED_CODE: i64 = 105;

/// Fixer family: `{success, base, date, timestamp, rates}` with the
/// credential as an `access_key` query parameter.
#[derive(Debug)]
pub struct FixerProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

impl FixerProvider {
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

    fn latest_url(&self, base: &str, symbols: Option<&[String]>) -> ProxyResult<Url> {
        let mut url = Url::parse(&format!("{}/latest", self.base_api_url))
            .map_err(|e| ProxyError::InvalidConfiguration(format!("Invalid API url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("access_key", self.api_key.as_deref().unwrap_or_default())
            .append_pair("base", base);
        if let Some(symbols) = symbols {
            url.query_pairs_mut()
                .append_pair("symbols", &symbols.join(","));
        }
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    base: Option<String>,
    date: Option<String>,
    timestamp: Option<i64>,
    rates: Option<HashMap<String, f64>>,
    error: Option<FixerErrorBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct FixerErrorBody {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

fn rejection(error: Option<FixerErrorBody>) -> ProviderRejection {
    let code = error.as_ref().and_then(|e| e.code);
    let kind = error.as_ref().and_then(|e| e.kind.clone());
    let detail = error
        .and_then(|e| serde_json::to_value(e).ok())
        .unwrap_or(serde_json::Value::Null);
    ProviderRejection { code, kind, detail }
}

#[async_trait]
impl RateProvider for FixerProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Fixer
    }

    fn has_credential(&self) -> bool {
        non_empty(self.api_key.as_deref()).is_some()
    }

    #[tracing::instrument(skip(self), fields(provider = %self.provider_kind()), level = "debug")]
    async fn latest(&self, base: &str, symbols: Option<&[String]>) -> ProxyResult<FetchOutcome> {
        let url = self.latest_url(base, symbols)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Some plans report errors with a 4xx status but still attach
            // the JSON error body.
            return match response.json::<FixerResponse>().await {
                Ok(body) => Ok(FetchOutcome::Rejected(rejection(body.error))),
                Err(_) => Err(ProxyError::UpstreamUnreachable(format!(
                    "Provider returned HTTP {status}"
                ))),
            };
        }

        let body = response.json::<FixerResponse>().await?;
        if body.success {
            let rates = body.rates.ok_or_else(|| {
                ProxyError::MalformedPayload("success response without rates".to_string())
            })?;
            return Ok(FetchOutcome::Table(ProviderTable {
                base: body.base.unwrap_or_else(|| base.to_string()),
                date: body.date,
                timestamp: body.timestamp,
                rates,
            }));
        }
        Ok(FetchOutcome::Rejected(rejection(body.error)))
    }

    fn fixed_base(&self) -> Option<&'static str> {
        Some("EUR")
    }

    fn is_restricted_base(&self, rejection: &ProviderRejection) -> bool {
        rejection.code == Some(BASE_RESTRICTED_CODE)
    }
}
