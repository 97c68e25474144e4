use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    pub summarizer_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub summary_connect_timeout_secs: u64,
    /// Total response timeout. The summarization call runs an LLM upstream
    /// and may legitimately take minutes.
    pub summary_response_timeout_secs: u64,
    pub summary_max_attempts: u32,
    pub summary_backoff_base_ms: u64,
    /// Worker task count; bounds concurrent outbound summarizer calls.
    pub dispatch_workers: usize,
    pub dispatch_queue_capacity: usize,
    pub stuck_sweep_cron: String,
    pub stuck_after_minutes: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("summarizer_url", &self.summarizer_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "summary_connect_timeout_secs",
                &self.summary_connect_timeout_secs,
            )
            .field(
                "summary_response_timeout_secs",
                &self.summary_response_timeout_secs,
            )
            .field("summary_max_attempts", &self.summary_max_attempts)
            .field("summary_backoff_base_ms", &self.summary_backoff_base_ms)
            .field("dispatch_workers", &self.dispatch_workers)
            .field("dispatch_queue_capacity", &self.dispatch_queue_capacity)
            .field("stuck_sweep_cron", &self.stuck_sweep_cron)
            .field("stuck_after_minutes", &self.stuck_after_minutes)
            .finish()
    }
}
