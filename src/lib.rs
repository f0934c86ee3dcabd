// src/lib.rs
// Public library surface for integration tests (and the shuttle binary).

pub mod api;
pub mod batch;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod review;
pub mod sentiment;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::batch::{AnalyzedReview, BatchAnalysis, BatchAnalyzer, BatchSummary};
pub use crate::config::AnalyzerConfig;
pub use crate::error::{Error, InvalidWindowParameters, LexiconLoadError, ReviewSkip};
pub use crate::lexicon::{Lexicon, RowPolicy};
pub use crate::normalize::{normalize, Sentence};
pub use crate::review::ReviewRecord;
pub use crate::sentiment::{rank_sentences, ScoredSentence, SentimentAnalyzer};
pub use crate::window::{
    most_negative, most_positive, score_windows, ScoredParagraph, SlidingWindow, WindowParams,
};

use anyhow::Context;
use axum::Router;
use tracing::info;

/// Build the HTTP app for `cfg`: loads the lexicon and wires the routes.
/// Metrics are installed separately by the binary (the recorder is global).
pub fn build_app(cfg: &AnalyzerConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)
        .with_context(|| format!("loading lexicon from {}", cfg.lexicon_path.display()))?;
    info!(
        window_size = cfg.window_size,
        step = cfg.step_size,
        max_reviews = cfg.max_reviews,
        top_n = cfg.top_n,
        "analyzer ready"
    );
    Ok(create_router(state))
}
