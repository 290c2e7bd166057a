use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Bearer token for the embedding service (OPENAI_API_KEY overrides)
    #[serde(default)]
    pub embedding_api_key: String,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    // CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_embedding_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_port() -> String {
    "80".to_string()
}

/// Vector store backend selection
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Pinecone,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Pinecone API key (PINECONE_API_KEY overrides)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Distance metric used when the index has to be created
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Serverless placement used when the index has to be created
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Give up waiting for a new index to become ready after this many seconds
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

fn default_index_name() -> String {
    "custom-gpt".to_string()
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_control_plane_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_api_version() -> String {
    "2024-07".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    300
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            api_key: String::new(),
            index_name: default_index_name(),
            metric: default_metric(),
            cloud: default_cloud(),
            region: default_region(),
            control_plane_url: default_control_plane_url(),
            api_version: default_api_version(),
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

/// Retrieval policy knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Primary result count when the caller gives no top_k
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Matches fetched per referenced note name
    #[serde(default = "default_linked_top_k")]
    pub linked_top_k: usize,

    /// Linked matches scoring above this are kept without a textual hit
    #[serde(default = "default_link_score_threshold")]
    pub link_score_threshold: f32,
}

fn default_top_k() -> usize {
    10
}

fn default_linked_top_k() -> usize {
    3
}

fn default_link_score_threshold() -> f32 {
    0.7
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            linked_top_k: default_linked_top_k(),
            link_score_threshold: default_link_score_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_cors_enabled() -> bool {
    false
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Log file placement, rotation and the fallback filter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file_name: String,

    /// Roll over once the active file reaches this size
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Rotated files kept besides the active one
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_file() -> String {
    "linkrag.log".to_string()
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_max_files() -> usize {
    9
}

fn default_log_filter() -> String {
    "linkrag_server=debug,linkrag_core=debug,actix_web=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file(),
            max_file_size_mb: default_max_file_size_mb(),
            max_files: default_max_files(),
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Secrets come from the environment when set
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("PINECONE_API_KEY").ok(),
        );
        self
    }

    fn apply_overrides(&mut self, openai_key: Option<String>, pinecone_key: Option<String>) {
        if let Some(key) = openai_key.filter(|k| !k.is_empty()) {
            self.embedding_api_key = key;
        }
        if let Some(key) = pinecone_key.filter(|k| !k.is_empty()) {
            self.store.api_key = key;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_url: default_embedding_url(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            embedding_api_key: String::new(),
            port: default_port(),
            insecure_skip_verify: false,
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
