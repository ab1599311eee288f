use {
    super::{new_http_client, non_empty},
    crate::{
        env::FootballConfig,
        error::{ProxyError, ProxyResult},
    },
};

/// api-sports.io forwarder; responses are passed through untouched so the
/// client sees the upstream's own `{get, results, response}` envelope.
#[derive(Debug)]
pub struct ApiSportsProvider {
    pub api_key: Option<String>,
    pub base_api_url: String,
    pub http_client: reqwest::Client,
}

impl ApiSportsProvider {
    pub fn new(config: &FootballConfig) -> ProxyResult<Self> {
        Ok(Self {
            api_key: config.api_sports_key.clone(),
            base_api_url: config.api_sports_url.clone(),
            http_client: new_http_client(config.timeout_secs)?,
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn countries(&self) -> ProxyResult<serde_json::Value> {
        self.forward("countries", &[]).await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn teams(
        &self,
        league: Option<&str>,
        season: Option<&str>,
    ) -> ProxyResult<serde_json::Value> {
        let mut params = Vec::new();
        if let Some(league) = league {
            params.push(("league", league));
        }
        if let Some(season) = season {
            params.push(("season", season));
        }
        self.forward("teams", &params).await
    }

    async fn forward(&self, path: &str, params: &[(&str, &str)]) -> ProxyResult<serde_json::Value> {
        let api_key = non_empty(self.api_key.as_deref()).ok_or(ProxyError::MissingCredential)?;

        let response = self
            .http_client
            .get(format!("{}/{path}", self.base_api_url))
            .query(params)
            .header("x-apisports-key", api_key)
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
