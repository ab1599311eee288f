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

const DEFAULT_API_URL: &str = "https://api.currencylayer.com";

// "Access Restricted - Your current Subscription Plan does not support
// Source Currency Switching"; only USD is served as the source.
const SOURCE_RESTRICTED_CODE: i64 = 105;

/// currencylayer family: `{success, quotes, source, timestamp}` where each
/// quote key is the source-prefixed pair (`"USDEUR"`).
#[derive(Debug)]
pub struct CurrencylayerProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

impl CurrencylayerProvider {
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

    fn live_url(&self, source: &str, symbols: Option<&[String]>) -> ProxyResult<Url> {
        let mut url = Url::parse(&format!("{}/live", self.base_api_url))
            .map_err(|e| ProxyError::InvalidConfiguration(format!("Invalid API url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("access_key", self.api_key.as_deref().unwrap_or_default())
            .append_pair("source", source);
        if let Some(symbols) = symbols {
            url.query_pairs_mut()
                .append_pair("currencies", &symbols.join(","));
        }
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct CurrencylayerResponse {
    success: bool,
    source: Option<String>,
    timestamp: Option<i64>,
    quotes: Option<HashMap<String, f64>>,
    error: Option<CurrencylayerErrorBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct CurrencylayerErrorBody {
    code: Option<i64>,
    info: Option<String>,
}

fn rejection(error: Option<CurrencylayerErrorBody>) -> ProviderRejection {
    let code = error.as_ref().and_then(|e| e.code);
    let detail = error
        .and_then(|e| serde_json::to_value(e).ok())
        .unwrap_or(serde_json::Value::Null);
    ProviderRejection {
        code,
        kind: None,
        detail,
    }
}

/// `"USDEUR": 0.92` becomes `"EUR": 0.92`; quotes not prefixed with the
/// source are dropped rather than guessed at.
fn unprefix_quotes(quotes: HashMap<String, f64>, source: &str) -> HashMap<String, f64> {
    quotes
        .into_iter()
        .filter_map(|(pair, rate)| {
            pair.strip_prefix(source)
                .filter(|code| !code.is_empty())
                .map(|code| (code.to_string(), rate))
        })
        .collect()
}

#[async_trait]
impl RateProvider for CurrencylayerProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Currencylayer
    }

    fn has_credential(&self) -> bool {
        non_empty(self.api_key.as_deref()).is_some()
    }

    #[tracing::instrument(skip(self), fields(provider = %self.provider_kind()), level = "debug")]
    async fn latest(&self, base: &str, symbols: Option<&[String]>) -> ProxyResult<FetchOutcome> {
        let url = self.live_url(base, symbols)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return match response.json::<CurrencylayerResponse>().await {
                Ok(body) => Ok(FetchOutcome::Rejected(rejection(body.error))),
                Err(_) => Err(ProxyError::UpstreamUnreachable(format!(
                    "Provider returned HTTP {status}"
                ))),
            };
        }

        let body = response.json::<CurrencylayerResponse>().await?;
        if body.success {
            let quotes = body.quotes.ok_or_else(|| {
                ProxyError::MalformedPayload("success response without quotes".to_string())
            })?;
            let source = body.source.unwrap_or_else(|| base.to_string());
            let rates = unprefix_quotes(quotes, &source);
            return Ok(FetchOutcome::Table(ProviderTable {
                base: source,
                date: None,
                timestamp: body.timestamp,
                rates,
            }));
        }
        Ok(FetchOutcome::Rejected(rejection(body.error)))
    }

    fn fixed_base(&self) -> Option<&'static str> {
        Some("USD")
    }

    fn is_restricted_base(&self, rejection: &ProviderRejection) -> bool {
        rejection.code == Some(SOURCE_RESTRICTED_CODE)
    }
}
