use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::batch::{AnalyzedReview, BatchAnalyzer, BatchSummary};
use crate::config::AnalyzerConfig;
use crate::error::InvalidWindowParameters;
use crate::lexicon::Lexicon;
use crate::normalize::normalize;
use crate::review::ReviewRecord;
use crate::sentiment::{rank_sentences, ScoredSentence};
use crate::window::{most_negative, most_positive, ScoredParagraph, SlidingWindow, WindowParams};

#[derive(Clone)]
pub struct AppState {
    batch: Arc<BatchAnalyzer>,
    top_n: usize,
}

impl AppState {
    pub fn new(lexicon: Arc<Lexicon>, cfg: &AnalyzerConfig) -> crate::error::Result<Self> {
        let params = WindowParams::new(cfg.window_size, cfg.step_size)?;
        Ok(Self {
            batch: Arc::new(BatchAnalyzer::new(lexicon, params, cfg.max_reviews)),
            top_n: cfg.top_n,
        })
    }

    /// Load the lexicon named by `cfg` and build the state around it.
    pub fn from_config(cfg: &AnalyzerConfig) -> crate::error::Result<Self> {
        let lexicon = Lexicon::load(&cfg.lexicon_path, cfg.row_policy)?;
        Self::new(Arc::new(lexicon), cfg)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Error body returned to HTTP callers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<InvalidWindowParameters> for ApiError {
    fn from(e: InvalidWindowParameters) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    window_size: Option<usize>,
    #[serde(default)]
    step: Option<usize>,
    #[serde(default)]
    top_n: Option<usize>,
}

#[derive(Serialize)]
struct AnalyzeResp {
    sentence_count: usize,
    window_count: usize,
    sentences: Vec<ScoredSentence>,
    ranked_sentences: Vec<ScoredSentence>,
    windows: Vec<ScoredParagraph>,
    most_positive: Vec<ScoredParagraph>,
    most_negative: Vec<ScoredParagraph>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    let defaults = state.batch.params();
    let params = WindowParams::new(
        body.window_size.unwrap_or(defaults.window_size()),
        body.step.unwrap_or(defaults.step()),
    )?;
    let top_n = body.top_n.unwrap_or(state.top_n);

    let analyzer = state.batch.analyzer();
    let normalized = normalize(&body.text);
    let sentences = analyzer.score_sentences(&normalized);
    let windows = SlidingWindow::new(params).score(analyzer, &normalized);

    Ok(Json(AnalyzeResp {
        sentence_count: sentences.len(),
        window_count: windows.len(),
        ranked_sentences: rank_sentences(&sentences),
        most_positive: most_positive(&windows, top_n),
        most_negative: most_negative(&windows, top_n),
        sentences,
        windows,
    }))
}

/// Either a bare array of reviews or `{ "reviews": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchReq {
    Bare(Vec<ReviewRecord>),
    Wrapped { reviews: Vec<ReviewRecord> },
}

impl BatchReq {
    fn into_reviews(self) -> Vec<ReviewRecord> {
        match self {
            BatchReq::Bare(v) | BatchReq::Wrapped { reviews: v } => v,
        }
    }
}

#[derive(Serialize)]
struct BatchResp {
    /// Reviews that were analyzed; skipped and capped-off records are not counted.
    total_reviews: usize,
    /// Records in the request body.
    received: usize,
    generated_at: DateTime<Utc>,
    summary: BatchSummary,
    most_positive_paragraphs: Vec<ScoredParagraph>,
    most_negative_paragraphs: Vec<ScoredParagraph>,
    reviews: Vec<AnalyzedReview>,
}

async fn analyze_batch(State(state): State<AppState>, Json(body): Json<BatchReq>) -> Json<BatchResp> {
    let reviews = body.into_reviews();
    let analysis = state.batch.analyze(&reviews);

    Json(BatchResp {
        total_reviews: analysis.reviews.len(),
        received: reviews.len(),
        generated_at: Utc::now(),
        summary: analysis.summary(),
        most_positive_paragraphs: analysis.most_positive_paragraphs(state.top_n),
        most_negative_paragraphs: analysis.most_negative_paragraphs(state.top_n),
        reviews: analysis.reviews,
    })
}
