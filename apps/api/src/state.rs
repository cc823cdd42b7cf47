use std::sync::Arc;

use crate::config::Config;
use crate::criteria::CriteriaSet;
use crate::metrics::ApiMetrics;
use crate::pipeline::classify::EvidenceClassifier;
use crate::pipeline::embedding::Embedder;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Criteria definitions, loaded once at startup.
    pub criteria: Arc<CriteriaSet>,
    /// Pluggable embedding backend. Default: fastembed. Swap via EMBEDDER_BACKEND env.
    pub embedder: Arc<dyn Embedder>,
    /// Pluggable evidence classifier. Default: LexicalClassifier. Swap via
    /// ENABLE_REMOTE_CLASSIFIER + HF_API_TOKEN env.
    pub classifier: Arc<dyn EvidenceClassifier>,
    pub metrics: Arc<ApiMetrics>,
}
