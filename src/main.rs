//! Review Sentiment Service: binary entrypoint.
//! Loads config and lexicon, installs metrics, and serves the Axum router.

use review_sentiment_analyzer::{build_app, metrics::Metrics, AnalyzerConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("review_sentiment_analyzer=info,warn"));

    // The shuttle runtime may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AnalyzerConfig::load_default()?;
    let app = build_app(&cfg)?;
    let metrics = Metrics::install(&cfg)?;

    Ok(app.merge(metrics.router()).into())
}
