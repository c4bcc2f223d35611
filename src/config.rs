use serde::{Deserialize, Serialize};
use std::env;

pub const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub api_key: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            // Empty key means search is disabled; no baked-in fallback credential.
            api_key: String::new(),
            endpoint: SERPER_SEARCH_URL.to_string(),
            timeout_seconds: 15,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                workers: num_cpus::get(),
            },
            search: SearchSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        // Server configuration
        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse()?;
        }
        if let Ok(workers) = env::var("WORKERS") {
            config.server.workers = workers.parse()?;
        }

        // Search provider configuration
        if let Ok(api_key) = env::var("SERPER_API_KEY") {
            config.search.api_key = api_key;
        }
        if let Ok(timeout_seconds) = env::var("SEARCH_TIMEOUT_SECONDS") {
            config.search.timeout_seconds = timeout_seconds.parse()?;
        }

        Ok(config)
    }
}
