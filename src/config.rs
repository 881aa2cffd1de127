use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Recommendation backend base URL (serves `/movies` and `/recommend`)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL for width-constrained poster images
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Base URL for full-resolution backdrop images
    #[serde(default = "default_backdrop_base_url")]
    pub backdrop_base_url: String,

    /// Placeholder image service used when no poster exists
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,

    /// Per-request timeout for every outbound call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_backdrop_base_url() -> String {
    "https://image.tmdb.org/t/p/original".to_string()
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/300x450/1a1a1a/e50914".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
