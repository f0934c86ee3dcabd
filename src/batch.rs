//! # Batch Review Analyzer
//! Pure, testable logic that maps a batch of reviews → per-review extremes
//! plus cross-review queries. No I/O apart from logs and metrics.
//!
//! Each review runs normalize → sentence scorer and normalize → window scorer
//! side by side. A review that cannot be analyzed is skipped with a
//! [`ReviewSkip`] reason; the batch itself never fails.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ReviewSkip;
use crate::lexicon::Lexicon;
use crate::normalize::normalize;
use crate::review::{preview, ReviewRecord};
use crate::sentiment::{ascending, descending, ScoredSentence, SentimentAnalyzer};
use crate::window::{most_negative, most_positive, ScoredParagraph, SlidingWindow, WindowParams};

/// Default cap on reviews considered per batch.
pub const DEFAULT_MAX_REVIEWS: usize = 10;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("reviews_analyzed_total", "Reviews analyzed successfully.");
        describe_counter!(
            "reviews_skipped_total",
            "Reviews skipped, labelled by reason."
        );
        describe_counter!("review_windows_total", "Sliding windows scored.");
        describe_counter!("review_sentences_total", "Sentences scored.");
        describe_histogram!("batch_analyze_ms", "Batch analysis time in milliseconds.");
    });
}

/// Short, non-reversible id for a review text; raw text never reaches the logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStatistics {
    pub total_paragraphs: usize,
    pub total_sentences: usize,
    /// Mean normalized window score.
    pub avg_paragraph_score: f64,
    pub avg_sentence_score: f64,
    pub paragraph_score_range: f64,
    pub sentence_score_range: f64,
}

/// Everything computed for one review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedReview {
    /// Position of the review in the input batch.
    pub review_index: usize,
    pub review_id: String,
    pub preview: String,
    pub statistics: ReviewStatistics,
    pub best_paragraph: ScoredParagraph,
    pub worst_paragraph: ScoredParagraph,
    pub best_sentence: ScoredSentence,
    pub worst_sentence: ScoredSentence,
    pub paragraphs: Vec<ScoredParagraph>,
    pub sentences: Vec<ScoredSentence>,
    /// Pass-through fields of the input record.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An extreme item together with the review it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Located<T> {
    pub review_index: usize,
    pub review_id: String,
    pub item: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub reviews_considered: usize,
    pub reviews_analyzed: usize,
    pub reviews_skipped: usize,
    pub total_paragraphs: usize,
    pub total_sentences: usize,
    pub avg_best_paragraph_score: f64,
    pub avg_best_sentence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_paragraph: Option<Located<ScoredParagraph>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_paragraph: Option<Located<ScoredParagraph>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_sentence: Option<Located<ScoredSentence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_sentence: Option<Located<ScoredSentence>>,
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchAnalysis {
    pub reviews: Vec<AnalyzedReview>,
    /// Records looked at (input length capped by `max_reviews`).
    pub considered: usize,
    pub skipped: usize,
}

impl BatchAnalysis {
    pub fn best_paragraph(&self) -> Option<Located<ScoredParagraph>> {
        first_extreme(&self.reviews, |r| &r.best_paragraph, |p| p.normalized_score, descending)
    }

    pub fn worst_paragraph(&self) -> Option<Located<ScoredParagraph>> {
        first_extreme(&self.reviews, |r| &r.worst_paragraph, |p| p.normalized_score, ascending)
    }

    pub fn best_sentence(&self) -> Option<Located<ScoredSentence>> {
        first_extreme(&self.reviews, |r| &r.best_sentence, |s| s.score, descending)
    }

    pub fn worst_sentence(&self) -> Option<Located<ScoredSentence>> {
        first_extreme(&self.reviews, |r| &r.worst_sentence, |s| s.score, ascending)
    }

    /// Every window of every analyzed review, in review then offset order.
    pub fn all_paragraphs(&self) -> Vec<ScoredParagraph> {
        self.reviews
            .iter()
            .flat_map(|r| r.paragraphs.iter().cloned())
            .collect()
    }

    /// Corpus-wide top `n` windows, highest normalized score first.
    pub fn most_positive_paragraphs(&self, n: usize) -> Vec<ScoredParagraph> {
        most_positive(&self.all_paragraphs(), n)
    }

    /// Corpus-wide top `n` windows, lowest normalized score first.
    pub fn most_negative_paragraphs(&self, n: usize) -> Vec<ScoredParagraph> {
        most_negative(&self.all_paragraphs(), n)
    }

    pub fn summary(&self) -> BatchSummary {
        let analyzed = self.reviews.len();
        let mean = |sum: f64| if analyzed == 0 { 0.0 } else { sum / analyzed as f64 };

        BatchSummary {
            reviews_considered: self.considered,
            reviews_analyzed: analyzed,
            reviews_skipped: self.skipped,
            total_paragraphs: self.reviews.iter().map(|r| r.statistics.total_paragraphs).sum(),
            total_sentences: self.reviews.iter().map(|r| r.statistics.total_sentences).sum(),
            avg_best_paragraph_score: mean(
                self.reviews.iter().map(|r| r.best_paragraph.normalized_score).fold(0.0, |a, b| a + b),
            ),
            avg_best_sentence_score: mean(
                self.reviews.iter().map(|r| r.best_sentence.score).fold(0.0, |a, b| a + b),
            ),
            best_paragraph: self.best_paragraph(),
            worst_paragraph: self.worst_paragraph(),
            best_sentence: self.best_sentence(),
            worst_sentence: self.worst_sentence(),
        }
    }
}

/// Applies the sentence and window scorers to each review of a batch.
#[derive(Debug, Clone)]
pub struct BatchAnalyzer {
    analyzer: SentimentAnalyzer,
    window: SlidingWindow,
    max_reviews: usize,
}

impl BatchAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>, params: WindowParams, max_reviews: usize) -> Self {
        Self {
            analyzer: SentimentAnalyzer::new(lexicon),
            window: SlidingWindow::new(params),
            max_reviews,
        }
    }

    pub fn analyzer(&self) -> &SentimentAnalyzer {
        &self.analyzer
    }

    pub fn params(&self) -> WindowParams {
        self.window.params()
    }

    pub fn max_reviews(&self) -> usize {
        self.max_reviews
    }

    /// Analyze up to `max_reviews` records. Records that fail are skipped.
    pub fn analyze(&self, reviews: &[ReviewRecord]) -> BatchAnalysis {
        ensure_metrics_described();
        let started = Instant::now();

        let mut out = BatchAnalysis::default();
        for (index, record) in reviews.iter().take(self.max_reviews).enumerate() {
            out.considered += 1;
            match self.analyze_review(index, record) {
                Ok(analyzed) => {
                    counter!("review_windows_total").increment(analyzed.paragraphs.len() as u64);
                    counter!("review_sentences_total").increment(analyzed.sentences.len() as u64);
                    out.reviews.push(analyzed);
                }
                Err(reason) => {
                    let text_id = record.text.as_deref().map(anon_hash).unwrap_or_default();
                    tracing::debug!(
                        review_id = %record.id,
                        %text_id,
                        reason = reason.label(),
                        "review skipped"
                    );
                    counter!("reviews_skipped_total", "reason" => reason.label()).increment(1);
                    out.skipped += 1;
                }
            }
        }

        counter!("reviews_analyzed_total").increment(out.reviews.len() as u64);
        histogram!("batch_analyze_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        tracing::info!(
            considered = out.considered,
            analyzed = out.reviews.len(),
            skipped = out.skipped,
            "batch analyzed"
        );
        out
    }

    /// Analyze a single record; `index` is its position in the batch.
    pub fn analyze_review(
        &self,
        index: usize,
        record: &ReviewRecord,
    ) -> Result<AnalyzedReview, ReviewSkip> {
        let text = record.text.as_deref().ok_or(ReviewSkip::MissingText)?;
        if text.trim().is_empty() {
            return Err(ReviewSkip::BlankText);
        }

        // Both scorers start from the normalizer output; neither feeds the other.
        let normalized = normalize(text);
        let sentences = self.analyzer.score_sentences(&normalized);
        let paragraphs: Vec<ScoredParagraph> = self
            .window
            .score(&self.analyzer, &normalized)
            .into_iter()
            .map(|p| p.with_review_id(record.id.clone()))
            .collect();

        if sentences.iter().any(|s| !s.score.is_finite())
            || paragraphs
                .iter()
                .any(|p| !p.raw_score.is_finite() || !p.normalized_score.is_finite())
        {
            return Err(ReviewSkip::NonFiniteScore);
        }

        let (Some(best_paragraph), Some(worst_paragraph)) = (
            pick(&paragraphs, |p| p.normalized_score, descending),
            pick(&paragraphs, |p| p.normalized_score, ascending),
        ) else {
            return Err(ReviewSkip::NoSentences);
        };
        let (Some(best_sentence), Some(worst_sentence)) = (
            pick(&sentences, |s| s.score, descending),
            pick(&sentences, |s| s.score, ascending),
        ) else {
            return Err(ReviewSkip::NoSentences);
        };

        let paragraph_scores: Vec<f64> = paragraphs.iter().map(|p| p.normalized_score).collect();
        let sentence_scores: Vec<f64> = sentences.iter().map(|s| s.score).collect();
        let statistics = ReviewStatistics {
            total_paragraphs: paragraphs.len(),
            total_sentences: sentences.len(),
            avg_paragraph_score: average(&paragraph_scores),
            avg_sentence_score: average(&sentence_scores),
            paragraph_score_range: range(&paragraph_scores),
            sentence_score_range: range(&sentence_scores),
        };

        Ok(AnalyzedReview {
            review_index: index,
            review_id: record.id.clone(),
            preview: preview(text),
            statistics,
            best_paragraph: best_paragraph.clone(),
            worst_paragraph: worst_paragraph.clone(),
            best_sentence: best_sentence.clone(),
            worst_sentence: worst_sentence.clone(),
            paragraphs,
            sentences,
            extra: record.extra.clone(),
        })
    }
}

/// First item that no later item beats under `order` (first max / first min).
fn pick<T, K, O>(items: &[T], key: K, order: O) -> Option<&T>
where
    K: Fn(&T) -> f64,
    O: Fn(f64, f64) -> std::cmp::Ordering,
{
    items.iter().fold(None, |best: Option<&T>, it| match best {
        Some(b) if order(key(it), key(b)).is_lt() => Some(it),
        Some(b) => Some(b),
        None => Some(it),
    })
}

fn first_extreme<T, F, K, O>(
    reviews: &[AnalyzedReview],
    field: F,
    key: K,
    order: O,
) -> Option<Located<T>>
where
    T: Clone,
    F: Fn(&AnalyzedReview) -> &T,
    K: Fn(&T) -> f64,
    O: Fn(f64, f64) -> std::cmp::Ordering,
{
    pick(reviews, |r| key(field(r)), order).map(|r| Located {
        review_index: r.review_index,
        review_id: r.review_id.clone(),
        item: field(r).clone(),
    })
}

fn average(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().fold(0.0, |a, b| a + b) / xs.len() as f64
    }
}

/// `max - min`, or 0 for an empty slice.
fn range(xs: &[f64]) -> f64 {
    let (lo, hi) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if xs.is_empty() {
        0.0
    } else {
        hi - lo
    }
}
