use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Managed database (problem table + hybrid-search RPC)
    pub database: DatabaseConfig,
    /// Object storage bucket for task bundles
    pub storage: StorageConfig,
    /// Test-case generator subprocess bounds
    pub generator: GeneratorConfig,
    /// PDF renderer binary
    pub pdf: PdfConfig,
    /// Max distinct queries memoized by the expansion cache
    pub expansion_cache_size: u64,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for chat (generation, tags, query expansion)
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
}

/// PostgREST-style gateway holding the problem catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Base URL of the database REST gateway
    pub base_url: String,
    /// Service API key, sent as both `apikey` and bearer token
    pub api_key: String,
    /// Table holding problem rows
    pub table: String,
    /// Server-side hybrid search function name
    pub search_function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the object storage gateway (defaults to the database URL)
    pub base_url: String,
    /// Same key as the database gateway
    pub api_key: String,
    /// Bucket receiving `<task_name>/<file_path>` objects
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Interpreter binary for running generator scripts
    pub python_bin: String,
    /// Wall-clock bound for one generator run
    pub timeout_secs: u64,
    /// Recursion ceiling applied inside the child interpreter
    pub recursion_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// HTML-to-PDF renderer binary
    pub wkhtmltopdf_bin: String,
    /// Wall-clock bound for one render
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            llm: LlmConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            generator: GeneratorConfig::default(),
            pdf: PdfConfig::default(),
            expansion_cache_size: 128,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            embedding_dim: 768,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            table: "problems".to_string(),
            search_function: "hybrid_search_problems".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            bucket: "problems".to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            python_bin: "python3".to_string(),
            timeout_secs: 30,
            recursion_limit: 1000,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            wkhtmltopdf_bin: "wkhtmltopdf".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("TASKSMITH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.base_url = url.trim_end_matches('/').to_string();
            config.storage.base_url = config.database.base_url.clone();
        }
        if let Ok(key) = std::env::var("DATABASE_KEY") {
            config.database.api_key = key.clone();
            config.storage.api_key = key;
        }
        if let Ok(table) = std::env::var("DATABASE_TABLE") {
            config.database.table = table;
        }
        if let Ok(func) = std::env::var("HYBRID_SEARCH_FUNCTION") {
            config.database.search_function = func;
        }
        if let Ok(url) = std::env::var("STORAGE_URL") {
            config.storage.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(bucket) = std::env::var("STORAGE_BUCKET") {
            config.storage.bucket = bucket;
        }

        if let Ok(bin) = std::env::var("GENERATOR_PYTHON_BIN") {
            config.generator.python_bin = bin;
        }
        if let Ok(val) = std::env::var("GENERATOR_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.generator.timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("GENERATOR_RECURSION_LIMIT") {
            if let Ok(v) = val.parse() {
                config.generator.recursion_limit = v;
            }
        }

        if let Ok(bin) = std::env::var("WKHTMLTOPDF_BIN") {
            config.pdf.wkhtmltopdf_bin = bin;
        }
        if let Ok(val) = std::env::var("PDF_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.pdf.timeout_secs = v;
            }
        }

        if let Ok(val) = std::env::var("EXPANSION_CACHE_SIZE") {
            if let Ok(v) = val.parse() {
                config.expansion_cache_size = v;
            }
        }
        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        config
    }
}
