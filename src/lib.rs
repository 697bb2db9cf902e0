//! Clarilab analysis core.
//!
//! Turns noisy, multi-language, multi-document lab-report extractions into
//! three things: one coherent patient identity, a benchmark-shaped set of
//! biomarker readings evaluated against reference ranges, and a decision
//! about which existing client record the results belong to.
//!
//! The document-understanding call, file ingestion, storage, and UI all
//! live outside this crate; they meet it at the [`extraction`] boundary
//! types and the [`analyzer::AnalysisRun`] output shape.

pub mod analysis;
pub mod analyzer;
pub mod client_match;
pub mod config;
pub mod consolidation;
pub mod extraction;
pub mod models;
pub mod taxonomy;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding applications. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Clarilab core v{}", config::APP_VERSION);
}
