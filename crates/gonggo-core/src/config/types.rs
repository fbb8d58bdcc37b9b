use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub faq: FaqConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_kintel_url() -> String {
    "http://127.0.0.1:3000/api/kintel".into()
}

fn default_models_url() -> String {
    "http://127.0.0.1:3000/api/models".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSection {
    #[serde(default = "default_kintel_url")]
    pub kintel_url: String,
    #[serde(default = "default_models_url")]
    pub models_url: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            kintel_url: default_kintel_url(),
            models_url: default_models_url(),
        }
    }
}

fn default_parse_timeout() -> u64 {
    30
}

fn default_summary_timeout() -> u64 {
    120
}

fn default_request_timeout() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_parse_timeout")]
    pub parse_seconds: u64,
    #[serde(default = "default_summary_timeout")]
    pub summary_seconds: u64,
    /// Transport default for every other call.
    #[serde(default = "default_request_timeout")]
    pub request_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            parse_seconds: default_parse_timeout(),
            summary_seconds: default_summary_timeout(),
            request_seconds: default_request_timeout(),
        }
    }
}

fn default_chunk_size() -> usize {
    500
}

fn default_window_ratio() -> f64 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_window_ratio")]
    pub window_ratio: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            window_ratio: default_window_ratio(),
        }
    }
}

fn default_summary_cap() -> usize {
    800
}

fn default_chunk_cap() -> usize {
    600
}

fn default_chunk_min() -> usize {
    200
}

fn default_retry_cap() -> usize {
    300
}

fn default_retry_delay() -> u64 {
    2
}

/// Limits for FAQ answer contexts, in chars.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaqConfig {
    #[serde(default = "default_summary_cap")]
    pub summary_cap: usize,
    #[serde(default = "default_chunk_cap")]
    pub chunk_cap: usize,
    /// Chunks shorter than this are padded with the start of the document.
    #[serde(default = "default_chunk_min")]
    pub chunk_min: usize,
    #[serde(default = "default_retry_cap")]
    pub retry_cap: usize,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            summary_cap: default_summary_cap(),
            chunk_cap: default_chunk_cap(),
            chunk_min: default_chunk_min(),
            retry_cap: default_retry_cap(),
            retry_delay_seconds: default_retry_delay(),
        }
    }
}

fn default_store_path() -> String {
    "./data/documents".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_max_file_size() -> u64 {
    gonggo_memory::DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_max_body() -> usize {
    60 * 1024 * 1024
}

fn default_kintel_upstream() -> String {
    "http://localhost:51037".into()
}

fn default_models_upstream() -> String {
    "http://localhost:51036".into()
}

fn default_faq_upstream() -> String {
    "http://localhost:51038".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
    #[serde(default = "default_kintel_upstream")]
    pub kintel_upstream: String,
    #[serde(default = "default_models_upstream")]
    pub models_upstream: String,
    #[serde(default = "default_faq_upstream")]
    pub faq_upstream: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            max_body_size: default_gateway_max_body(),
            kintel_upstream: default_kintel_upstream(),
            models_upstream: default_models_upstream(),
            faq_upstream: default_faq_upstream(),
        }
    }
}
