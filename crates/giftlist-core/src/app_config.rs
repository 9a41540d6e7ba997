use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Base URL of the JS-rendering proxy the scraper routes through.
    pub scraper_proxy_base_url: String,
    /// API credential sent to the rendering proxy as a query parameter.
    pub scraper_api_key: String,
    /// Two-letter country code the proxy should render from.
    pub scraper_country: String,
    /// Origin of the retail site being scraped.
    pub scraper_source_base_url: String,
    pub scraper_request_timeout_secs: u64,
    /// Hard cap on listing pages fetched per category per ingest run.
    pub scraper_max_pages_per_category: u32,
    pub scraper_inter_request_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scraper_proxy_base_url", &self.scraper_proxy_base_url)
            .field("scraper_api_key", &"[redacted]")
            .field("scraper_country", &self.scraper_country)
            .field("scraper_source_base_url", &self.scraper_source_base_url)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "scraper_max_pages_per_category",
                &self.scraper_max_pages_per_category,
            )
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .finish()
    }
}
