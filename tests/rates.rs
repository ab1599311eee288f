use {
    fg_proxy::{
        env::RatesConfig,
        error::ProxyError,
        providers::{CurrencylayerProvider, ExchangeRateApiProvider, FixerProvider, ProviderKind},
        rates::{normalize, RateQuery},
    },
    serde_json::json,
    wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    },
};

const TOLERANCE: f64 = 1e-9;

fn rates_config(kind: ProviderKind, api_key: Option<&str>, url: &str) -> RatesConfig {
    RatesConfig {
        provider: kind,
        api_key: api_key.map(str::to_string),
        base_api_url: Some(url.to_string()),
        timeout_secs: 5,
    }
}

fn query(base: &str, symbols: Option<&str>) -> RateQuery {
    RateQuery::from_params(Some(base.to_string()), symbols.map(str::to_string)).unwrap()
}

#[tokio::test]
async fn fixer_primary_success_filters_requested_symbols() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("access_key", "test-key"))
        .and(query_param("base", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "base": "USD",
            "date": "2024-05-01",
            "timestamp": 1_714_521_600,
            "rates": { "EUR": 0.92, "GBP": 0.79, "JPY": 150.0 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, Some("test-key"), &server.uri()))
            .unwrap();
    let table = normalize(&provider, &query("USD", Some("EUR,GBP")))
        .await
        .unwrap();

    assert!(table.success);
    assert_eq!(table.base, "USD");
    assert_eq!(table.date, "2024-05-01");
    assert_eq!(table.timestamp, 1_714_521_600);
    assert_eq!(table.rates.len(), 2);
    assert_eq!(table.rates.get("EUR"), Some(&0.92));
    assert_eq!(table.rates.get("GBP"), Some(&0.79));
}

#[tokio::test]
async fn fixer_restricted_base_is_derived_through_eur() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("base", "GBP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {
                "code": 105,
                "type": "base_currency_access_restricted",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("base", "EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "base": "EUR",
            "date": "2024-05-01",
            "rates": { "USD": 1.1, "GBP": 0.87 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, Some("test-key"), &server.uri()))
            .unwrap();
    let table = normalize(&provider, &query("GBP", None)).await.unwrap();

    assert_eq!(table.base, "GBP");
    assert!((table.rates["USD"] - 1.1 / 0.87).abs() < TOLERANCE);
    assert!(!table.rates.contains_key("GBP"));
    assert_eq!(table.date, "2024-05-01");
}

#[tokio::test]
async fn fixer_missing_credential_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, None, &server.uri())).unwrap();
    let result = normalize(&provider, &query("USD", None)).await;

    assert!(matches!(result, Err(ProxyError::MissingCredential)));
}

#[tokio::test]
async fn fixer_unreachable_upstream_is_reported_as_such() {
    // Nothing listens on this port.
    let provider = FixerProvider::new(&rates_config(
        ProviderKind::Fixer,
        Some("test-key"),
        "http://127.0.0.1:9",
    ))
    .unwrap();
    let result = normalize(&provider, &query("USD", None)).await;

    assert!(matches!(result, Err(ProxyError::UpstreamUnreachable(_))));
}

#[tokio::test]
async fn fixer_unguarded_rejection_carries_the_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {
                "code": 101,
                "type": "invalid_access_key",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, Some("bad-key"), &server.uri()))
            .unwrap();
    let result = normalize(&provider, &query("USD", None)).await;

    match result {
        Err(ProxyError::ProviderRejected(details)) => {
            assert_eq!(details["code"], 101);
            assert_eq!(details["type"], "invalid_access_key");
        }
        other => panic!("expected ProviderRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn fixer_non_json_body_is_a_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, Some("test-key"), &server.uri()))
            .unwrap();
    let result = normalize(&provider, &query("USD", None)).await;

    assert!(matches!(result, Err(ProxyError::MalformedPayload(_))));
}

#[tokio::test]
async fn exchangerate_api_latest_shapes_date_from_the_update_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test-key/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "base_code": "USD",
            "time_last_update_unix": 1_714_521_600,
            "conversion_rates": { "USD": 1.0, "EUR": 0.92, "GBP": 0.79 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ExchangeRateApiProvider::new(&rates_config(
        ProviderKind::ExchangeRateApi,
        Some("test-key"),
        &server.uri(),
    ))
    .unwrap();
    let table = normalize(&provider, &query("USD", None)).await.unwrap();

    assert_eq!(table.date, "2024-05-01");
    assert_eq!(table.timestamp, 1_714_521_600);
    // The provider lists the base at 1.0; the canonical table never does.
    assert!(!table.rates.contains_key("USD"));
    assert_eq!(table.rates.len(), 2);
}

#[tokio::test]
async fn exchangerate_api_pair_fallback_converts_each_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test-key/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "error",
            "error-type": "plan-upgrade-required",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/test-key/pair/USD/EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "conversion_rate": 0.92,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/test-key/pair/USD/GBP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "conversion_rate": 0.79,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ExchangeRateApiProvider::new(&rates_config(
        ProviderKind::ExchangeRateApi,
        Some("test-key"),
        &server.uri(),
    ))
    .unwrap();
    let table = normalize(&provider, &query("USD", Some("EUR,GBP")))
        .await
        .unwrap();

    assert_eq!(table.rates.len(), 2);
    assert_eq!(table.rates.get("EUR"), Some(&0.92));
    assert_eq!(table.rates.get("GBP"), Some(&0.79));
}

#[tokio::test]
async fn exchangerate_api_unsupported_base_is_derived_through_usd() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test-key/latest/XAU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "error",
            "error-type": "unsupported-code",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/test-key/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "base_code": "USD",
            "conversion_rates": { "USD": 1.0, "XAU": 0.0005, "EUR": 0.92 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ExchangeRateApiProvider::new(&rates_config(
        ProviderKind::ExchangeRateApi,
        Some("test-key"),
        &server.uri(),
    ))
    .unwrap();
    let table = normalize(&provider, &query("XAU", None)).await.unwrap();

    assert_eq!(table.base, "XAU");
    assert!((table.rates["EUR"] - 0.92 / 0.0005).abs() < TOLERANCE);
    assert!((table.rates["USD"] - 1.0 / 0.0005).abs() < TOLERANCE);
    assert!(!table.rates.contains_key("XAU"));
}

#[tokio::test]
async fn currencylayer_quotes_become_a_canonical_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .and(query_param("source", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "source": "USD",
            "timestamp": 1_714_521_600,
            "quotes": { "USDEUR": 0.92, "USDGBP": 0.79, "USDUSD": 1.0 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = CurrencylayerProvider::new(&rates_config(
        ProviderKind::Currencylayer,
        Some("test-key"),
        &server.uri(),
    ))
    .unwrap();
    let table = normalize(&provider, &query("USD", Some("EUR,GBP")))
        .await
        .unwrap();

    assert_eq!(table.base, "USD");
    assert_eq!(table.timestamp, 1_714_521_600);
    assert_eq!(table.rates.len(), 2);
    assert_eq!(table.rates.get("EUR"), Some(&0.92));
    assert!(!table.rates.contains_key("USD"));
}

#[tokio::test]
async fn currencylayer_restricted_source_is_derived_through_usd() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .and(query_param("source", "EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {
                "code": 105,
                "info": "Access Restricted - Your current Subscription Plan does not support Source Currency Switching.",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .and(query_param("source", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "source": "USD",
            "timestamp": 1_714_521_600,
            "quotes": { "USDUSD": 1.0, "USDEUR": 0.92, "USDGBP": 0.79 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = CurrencylayerProvider::new(&rates_config(
        ProviderKind::Currencylayer,
        Some("test-key"),
        &server.uri(),
    ))
    .unwrap();
    let table = normalize(&provider, &query("EUR", None)).await.unwrap();

    assert_eq!(table.base, "EUR");
    assert!((table.rates["GBP"] - 0.79 / 0.92).abs() < TOLERANCE);
    assert!((table.rates["USD"] - 1.0 / 0.92).abs() < TOLERANCE);
    assert!(!table.rates.contains_key("EUR"));
}

#[tokio::test]
async fn identical_queries_return_identical_tables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "base": "USD",
            "date": "2024-05-01",
            "timestamp": 1_714_521_600,
            "rates": { "EUR": 0.92, "GBP": 0.79 },
        })))
        .expect(2)
        .mount(&server)
        .await;

    let provider =
        FixerProvider::new(&rates_config(ProviderKind::Fixer, Some("test-key"), &server.uri()))
            .unwrap();
    let query = query("USD", Some("EUR,GBP"));
    let first = normalize(&provider, &query).await.unwrap();
    let second = normalize(&provider, &query).await.unwrap();

    assert_eq!(first, second);
}
