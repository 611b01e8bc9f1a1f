use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://swapi.info/api/films";
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Collection URL used for both listing and creating movies.
    pub endpoint: String,
    /// Wait between a failed load and the automatic next attempt.
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl AppConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        AppConfig {
            endpoint: endpoint.into(),
            ..AppConfig::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: format!("filmgrid/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
