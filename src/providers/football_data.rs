use {
    super::{new_http_client, non_empty},
    crate::{
        env::FootballConfig,
        error::{ProxyError, ProxyResult},
    },
};

/// football-data.org forwarder (competitions catalogue). Keyed with the
/// `X-Auth-Token` header, unlike the api-sports family.
#[derive(Debug)]
pub struct FootballDataProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

impl FootballDataProvider {
    pub fn new(config: &FootballConfig) -> ProxyResult<Self> {
        Ok(Self {
            api_key: config.football_data_key.clone(),
            base_api_url: config.football_data_url.clone(),
            http_client: new_http_client(config.timeout_secs)?,
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn competitions(&self) -> ProxyResult<serde_json::Value> {
        let api_key = non_empty(self.api_key.as_deref()).ok_or(ProxyError::MissingCredential)?;

        let response = self
            .http_client
            .get(format!("{}/competitions", self.base_api_url))
            .header("X-Auth-Token", api_key)
            .send()
            .await?;
        let status = response.status();

        match response.json::<serde_json::Value>().await {
            Ok(body) => Ok(body),
            Err(_) if !status.is_success() => Err(ProxyError::UpstreamUnreachable(format!(
                "Provider returned HTTP {status}"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
