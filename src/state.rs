use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::session::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api.base_url)?;
        Ok(Self {
            config,
            api,
            sessions: Arc::new(SessionRegistry::new()),
        })
    }
}
