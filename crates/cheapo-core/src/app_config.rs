use std::net::SocketAddr;
use std::path::PathBuf;

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
    pub telegram_bot_token: String,
    pub search_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub approved_users: Vec<i64>,
    pub bot_user_id: Option<i64>,
    pub webhook_secret: Option<String>,
    pub telegram_api_url: String,
    pub catalog_path: Option<PathBuf>,
    pub page_size: usize,
    pub radius_step: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    pub offer_summary_max_chars: usize,
    pub http_timeout_secs: u64,
    pub search_max_retries: u32,
    pub search_retry_backoff_ms: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("telegram_bot_token", &"[redacted]")
            .field("search_url", &self.search_url)
            .field("approved_users", &self.approved_users)
            .field("bot_user_id", &self.bot_user_id)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_api_url", &self.telegram_api_url)
            .field("catalog_path", &self.catalog_path)
            .field("page_size", &self.page_size)
            .field("radius_step", &self.radius_step)
            .field("min_radius", &self.min_radius)
            .field("max_radius", &self.max_radius)
            .field("offer_summary_max_chars", &self.offer_summary_max_chars)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("search_max_retries", &self.search_max_retries)
            .field("search_retry_backoff_ms", &self.search_retry_backoff_ms)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
