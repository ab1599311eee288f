use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error;

mod football;
mod geocoding;
mod rates;
mod server;

pub use football::*;
pub use geocoding::*;
pub use rates::*;
pub use server::*;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub rates: RatesConfig,
    pub football: FootballConfig,
    pub geocoding: GeocodingConfig,
}

impl Config {
    pub fn from_env() -> error::ProxyResult<Config> {
        Ok(Self {
            server: from_env("FG_PROXY_")?,
            rates: from_env("FG_PROXY_RATES_")?,
            football: from_env("FG_PROXY_FOOTBALL_")?,
            geocoding: from_env("FG_PROXY_GEOCODING_")?,
        })
    }
}

fn from_env<T: DeserializeOwned>(prefix: &str) -> Result<T, envy::Error> {
    envy::prefixed(prefix).from_env()
}
