use serde::Deserialize;
use serde_piecewise_default::DeserializePiecewiseDefault;

#[derive(DeserializePiecewiseDefault, Debug, Clone)]
pub struct FootballConfig {
    /// Credential for the api-sports.io family (countries, teams).
    pub api_sports_key: Option<String>,
    /// Credential for football-data.org (competitions, leagues).
    pub football_data_key: Option<String>,
    pub api_sports_url: String,
    pub football_data_url: String,
    pub timeout_secs: u64,
}

impl Default for FootballConfig {
    fn default() -> Self {
        FootballConfig {
            api_sports_key: None,
            football_data_key: None,
            api_sports_url: "https://v3.football.api-sports.io".to_string(),
            football_data_url: "https://api.football-data.org/v4".to_string(),
            timeout_secs: 5,
        }
    }
}
