use crate::{env::Config, providers::ProviderRepository};

pub struct AppState {
    pub config: Config,
    pub providers: ProviderRepository,
}

pub fn new_state(config: Config, providers: ProviderRepository) -> AppState {
    AppState { config, providers }
}
