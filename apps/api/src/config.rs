use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a sensible default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Path to the JSON file with the eight O-1A criteria definitions.
    pub criteria_file: String,
    /// Hard cap on uploaded CV size. Uploads beyond this return 413.
    pub max_upload_bytes: usize,
    /// Embedding backend: "fastembed" (local model) or "hash" (deterministic).
    pub embedder_backend: String,
    /// Hugging Face API token for the remote zero-shot classifier.
    pub hf_api_token: Option<String>,
    /// Opt-in switch for the remote classifier; without it the lexical
    /// scorer is used even when a token is present.
    pub enable_remote_classifier: bool,
    /// How many chunks to retrieve per criterion before classification.
    pub retrieval_top_k: usize,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_RETRIEVAL_TOP_K: usize = 5;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            criteria_file: std::env::var("CRITERIA_FILE")
                .unwrap_or_else(|_| "data/o1a_criteria.json".to_string()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            embedder_backend: std::env::var("EMBEDDER_BACKEND")
                .unwrap_or_else(|_| "fastembed".to_string()),
            hf_api_token: std::env::var("HF_API_TOKEN").ok(),
            enable_remote_classifier: std::env::var("ENABLE_REMOTE_CLASSIFIER")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            retrieval_top_k: std::env::var("RETRIEVAL_TOP_K")
                .unwrap_or_else(|_| DEFAULT_RETRIEVAL_TOP_K.to_string())
                .parse::<usize>()
                .context("RETRIEVAL_TOP_K must be a positive integer")?,
        })
    }
}
