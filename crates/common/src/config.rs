/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Candle provider
    pub provider_base_url: String,
    pub provider_api_key: String,
    pub provider_timeout_secs: u64,

    // Database
    pub database_url: String,

    // HTTP surface
    pub api_port: u16,

    // Evaluation schedule
    pub eval_interval_secs: u64,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            provider_base_url: required_env("PROVIDER_BASE_URL"),
            provider_api_key: required_env("PROVIDER_API_KEY"),
            provider_timeout_secs: optional_env("PROVIDER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            database_url: required_env("DATABASE_URL"),
            api_port: optional_env("API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            eval_interval_secs: optional_env("EVAL_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
