use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::DocRagError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub dimension: usize,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_batch_size() -> usize {
    64
}

fn default_max_retries() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    #[serde(default)]
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> usize {
    800
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub upload_dir: PathBuf,
    /// Maximum segment size in words
    pub chunk_size: usize,
    /// Words shared between consecutive segments
    pub chunk_overlap: usize,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_top_k: usize,
    pub max_context_chars: usize,
    pub max_history_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub enable_vector_indexes: bool,
    pub vector_index_lists: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Bearer token required on every route but `/health`; auth is off when unset
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub ingestion: IngestionConfig,
    pub retrieval: RetrievalConfig,
    pub performance: PerformanceConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default locations, apply environment
    /// overrides and validate the result.
    ///
    /// Looks for `config.toml`, then `config.example.toml`, then falls back to
    /// built-in defaults. A `.env` file in the working directory is honoured.
    pub fn load() -> crate::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let mut config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from environment-style variables.
    ///
    /// The lookup is injected so tests do not have to touch the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.llm_key = key;
        }
        if let Some(key) = non_empty("EMBEDDING_API_KEY") {
            self.embeddings.api_key = key;
        }
        if let Some(token) = non_empty("SECRET_TOKEN") {
            self.server.auth_token = Some(token);
        }
        if let Some(dir) = non_empty("DOCRAG_UPLOAD_DIR") {
            self.ingestion.upload_dir = PathBuf::from(dir);
        }
        if let Some(level) = non_empty("DOCRAG_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Fail fast on missing credentials or inconsistent settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(DocRagError::ConfigError(
                "database connection string is required (set DATABASE_URL)".to_string(),
            ));
        }
        if self.llm.llm_key.trim().is_empty() {
            return Err(DocRagError::ConfigError(
                "LLM API key is required (set OPENAI_API_KEY)".to_string(),
            ));
        }
        if self.embeddings.api_key.trim().is_empty() {
            return Err(DocRagError::ConfigError(
                "embedding service key is required (set EMBEDDING_API_KEY)".to_string(),
            ));
        }

        for (name, endpoint) in [
            ("llm.llm_endpoint", &self.llm.llm_endpoint),
            ("embeddings.endpoint", &self.embeddings.endpoint),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                DocRagError::ConfigError(format!("{name} is not a valid URL ({endpoint}): {e}"))
            })?;
        }

        if self.ingestion.chunk_size == 0 {
            return Err(DocRagError::ConfigError(
                "ingestion.chunk_size must be positive".to_string(),
            ));
        }
        if self.ingestion.chunk_overlap >= self.ingestion.chunk_size {
            return Err(DocRagError::ConfigError(format!(
                "ingestion.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.ingestion.chunk_overlap, self.ingestion.chunk_size
            )));
        }
        if self.embeddings.dimension == 0 || self.embeddings.batch_size == 0 {
            return Err(DocRagError::ConfigError(
                "embeddings.dimension and embeddings.batch_size must be positive".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 || self.retrieval.top_k > self.retrieval.max_top_k {
            return Err(DocRagError::ConfigError(format!(
                "retrieval.top_k must be between 1 and max_top_k ({})",
                self.retrieval.max_top_k
            )));
        }

        Ok(())
    }

    /// Get database URL
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Get max connections for database pool
    pub fn max_connections(&self) -> u32 {
        self.database.max_connections
    }

    /// Get min connections for database pool
    pub fn min_connections(&self) -> u32 {
        self.database.min_connections
    }

    /// Get connection timeout in seconds
    pub fn connection_timeout(&self) -> u64 {
        self.database.connection_timeout
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Check if vector indexes are enabled
    pub fn vector_indexes_enabled(&self) -> bool {
        self.performance.enable_vector_indexes
    }

    /// Get vector index lists count
    pub fn vector_index_lists(&self) -> usize {
        self.performance.vector_index_lists
    }

    /// Copy of the configuration with secrets masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.database.url = mask_database_url(&copy.database.url);
        copy.llm.llm_key = mask_secret(&copy.llm.llm_key);
        copy.embeddings.api_key = mask_secret(&copy.embeddings.api_key);
        copy.server.auth_token = copy.server.auth_token.as_deref().map(mask_secret);
        copy
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        let visible: String = secret.chars().take(4).collect();
        format!("{visible}****")
    }
}

fn mask_database_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                min_connections: 2,
                connection_timeout: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
                batch_size: default_embedding_batch_size(),
                max_retries: default_max_retries(),
                timeout_secs: default_timeout_secs(),
            },
            llm: LlmConfig {
                llm_endpoint: "https://api.openai.com/v1".to_string(),
                llm_key: String::new(),
                llm_model: default_llm_model(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                max_retries: default_max_retries(),
                timeout_secs: default_timeout_secs(),
            },
            ingestion: IngestionConfig {
                upload_dir: PathBuf::from("uploads"),
                chunk_size: 200,
                chunk_overlap: 50,
                max_upload_bytes: 20 * 1024 * 1024,
            },
            retrieval: RetrievalConfig {
                top_k: 4,
                max_top_k: 20,
                max_context_chars: 8000,
                max_history_turns: 10,
            },
            performance: PerformanceConfig {
                enable_vector_indexes: true,
                vector_index_lists: 100,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                enable_cors: false,
                auth_token: None,
            },
        }
    }
}
