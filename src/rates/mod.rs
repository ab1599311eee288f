use {
    crate::{
        error::{ProxyError, ProxyResult},
        providers::{FetchOutcome, ProviderRejection, ProviderTable, RateProvider},
    },
    chrono::{DateTime, NaiveDate, Utc},
    serde::Serialize,
    std::collections::HashMap,
};

/// One incoming rate request, codes normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    pub base: String,
    pub symbols: Option<Vec<String>>,
}

impl RateQuery {
    /// Builds a query from the raw `base` and comma-separated `symbols`
    /// query parameters. Blank symbol entries are dropped; an entirely blank
    /// list counts as absent.
    pub fn from_params(base: Option<String>, symbols: Option<String>) -> ProxyResult<Self> {
        let base = match base {
            None => "USD".to_string(),
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ProxyError::InvalidQuery(
                        "base must be a non-empty currency code".to_string(),
                    ));
                }
                trimmed.to_uppercase()
            }
        };

        let symbols = symbols.and_then(|raw| {
            let list: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|symbol| !symbol.is_empty())
                .map(str::to_uppercase)
                .collect();
            if list.is_empty() {
                None
            } else {
                Some(list)
            }
        });

        Ok(Self { base, symbols })
    }
}

/// Canonical rate table served to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateTable {
    pub success: bool,
    pub base: String,
    pub date: String,
    pub rates: HashMap<String, f64>,
    pub timestamp: i64,
}

/// Fallback selected from the provider's rejection of the primary request.
#[derive(Debug)]
enum Step<'a> {
    FallbackFixedBase(&'a str),
    FallbackConvert(&'a [String]),
    Failed,
}

fn next_step<'a>(
    provider: &dyn RateProvider,
    query: &'a RateQuery,
    rejection: &ProviderRejection,
) -> Step<'a> {
    if let Some(fixed_base) = provider.fixed_base() {
        if provider.is_restricted_base(rejection) {
            return Step::FallbackFixedBase(fixed_base);
        }
    }
    if let Some(symbols) = query.symbols.as_deref() {
        if provider.is_pair_only(rejection) {
            return Step::FallbackConvert(symbols);
        }
    }
    Step::Failed
}

/// Produces the canonical table for `query`, falling back when the provider
/// cannot serve the requested base directly:
/// `Primary -> FallbackFixedBase | FallbackConvert -> Succeeded/Failed`.
/// Upstream calls are strictly sequential; at most one fallback runs.
pub async fn normalize(provider: &dyn RateProvider, query: &RateQuery) -> ProxyResult<RateTable> {
    if !provider.has_credential() {
        return Err(ProxyError::MissingCredential);
    }

    let rejection = match provider.latest(&query.base, query.symbols.as_deref()).await? {
        FetchOutcome::Table(table) => return Ok(shape(table, query)),
        FetchOutcome::Rejected(rejection) => rejection,
    };

    match next_step(provider, query, &rejection) {
        Step::FallbackFixedBase(fixed_base) => {
            fixed_base_fallback(provider, query, fixed_base, rejection).await
        }
        Step::FallbackConvert(symbols) => {
            convert_fallback(provider, query, symbols, rejection).await
        }
        Step::Failed => Err(rejected(rejection)),
    }
}

/// Re-queries with the provider's fixed base and re-expresses that table
/// against the requested base.
async fn fixed_base_fallback(
    provider: &dyn RateProvider,
    query: &RateQuery,
    fixed_base: &str,
    rejection: ProviderRejection,
) -> ProxyResult<RateTable> {
    // Unfiltered on purpose: the requested base's own quote is the pivot.
    let table = match provider.latest(fixed_base, None).await? {
        FetchOutcome::Table(table) => table,
        FetchOutcome::Rejected(second) => return Err(rejected(second)),
    };

    let Some(rates) = derive_cross_rates(&table.rates, &query.base) else {
        return Err(rejected(rejection));
    };

    Ok(shape(
        ProviderTable {
            base: query.base.clone(),
            date: table.date,
            timestamp: table.timestamp,
            rates,
        },
        query,
    ))
}

/// Derives one requested symbol at a time through the pair endpoint; pairs
/// the provider does not serve are omitted.
async fn convert_fallback(
    provider: &dyn RateProvider,
    query: &RateQuery,
    symbols: &[String],
    rejection: ProviderRejection,
) -> ProxyResult<RateTable> {
    let mut rates = HashMap::new();
    for symbol in symbols {
        if symbol.eq_ignore_ascii_case(&query.base) {
            continue;
        }
        if let Some(rate) = provider.convert(&query.base, symbol).await? {
            rates.insert(symbol.clone(), rate);
        }
    }

    if rates.is_empty() {
        return Err(rejected(rejection));
    }

    Ok(shape(
        ProviderTable {
            base: query.base.clone(),
            date: None,
            timestamp: None,
            rates,
        },
        query,
    ))
}

fn rejected(rejection: ProviderRejection) -> ProxyError {
    ProxyError::ProviderRejected(rejection.detail)
}

/// `derived[c] = fixed[c] / fixed[base]`, omitting `c == base`. `None` when
/// the base's own quote is absent or zero.
fn derive_cross_rates(
    fixed: &HashMap<String, f64>,
    base: &str,
) -> Option<HashMap<String, f64>> {
    let pivot = fixed
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(base))
        .map(|(_, rate)| *rate)?;
    if pivot == 0.0 {
        return None;
    }
    Some(
        fixed
            .iter()
            .filter(|(code, _)| !code.eq_ignore_ascii_case(base))
            .map(|(code, rate)| (code.clone(), rate / pivot))
            .collect(),
    )
}

/// Applies the canonical shaping: requested-symbol filtering, removal of the
/// base's own entry, and date/timestamp defaulting.
fn shape(table: ProviderTable, query: &RateQuery) -> RateTable {
    let base = table.base.to_uppercase();
    let rates = table
        .rates
        .into_iter()
        .filter_map(|(code, rate)| {
            let code = code.to_uppercase();
            if code == base {
                return None;
            }
            match query.symbols.as_deref() {
                Some(symbols) if !symbols.iter().any(|s| s.eq_ignore_ascii_case(&code)) => None,
                _ => Some((code, rate)),
            }
        })
        .collect();

    let (date, timestamp) = date_and_timestamp(table.date, table.timestamp);
    RateTable {
        success: true,
        base,
        date,
        rates,
        timestamp,
    }
}

fn date_and_timestamp(date: Option<String>, timestamp: Option<i64>) -> (String, i64) {
    let now = Utc::now();
    match (date, timestamp) {
        (Some(date), Some(timestamp)) => (date, timestamp),
        (Some(date), None) => {
            let timestamp = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc().timestamp())
                .unwrap_or_else(|| now.timestamp());
            (date, timestamp)
        }
        (None, Some(timestamp)) => {
            let date = DateTime::from_timestamp(timestamp, 0)
                .unwrap_or(now)
                .format("%Y-%m-%d")
                .to_string();
            (date, timestamp)
        }
        (None, None) => (now.format("%Y-%m-%d").to_string(), now.timestamp()),
    }
}
