//! # Sliding Window
//! Paragraph-level scoring over runs of consecutive sentences.
//!
//! A window of `W` sentences starts at offsets `0, S, 2S, ...` while it still
//! fits. Each window is rebuilt as paragraph text (`"a. b. c."`) and scored
//! from that text. The normalized score (raw score / word count) is what
//! windows are ranked by, so long windows do not win just by being long.
//!
//! A review with fewer than `W` sentences yields exactly one window holding
//! all of them.

use serde::Serialize;

use crate::error::InvalidWindowParameters;
use crate::normalize::Sentence;
use crate::sentiment::{ascending, descending, SentimentAnalyzer};

/// Validated window size and step (both >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowParams {
    window_size: usize,
    step: usize,
}

impl WindowParams {
    pub fn new(window_size: usize, step: usize) -> Result<Self, InvalidWindowParameters> {
        if window_size == 0 || step == 0 {
            return Err(InvalidWindowParameters { window_size, step });
        }
        Ok(Self { window_size, step })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            window_size: 3,
            step: 1,
        }
    }
}

/// One scored window of sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredParagraph {
    pub paragraph: String,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub word_count: usize,
    /// Id of the review the window came from (set by the batch analyzer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    /// Index of the first sentence of the window.
    pub window_start: usize,
    pub sentences_in_window: usize,
}

impl ScoredParagraph {
    pub fn with_review_id(mut self, id: impl Into<String>) -> Self {
        self.review_id = Some(id.into());
        self
    }
}

/// Sliding window scorer bound to one set of parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlidingWindow {
    params: WindowParams,
}

impl SlidingWindow {
    pub fn new(params: WindowParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> WindowParams {
        self.params
    }

    /// Score every window of `sentences`, in offset order.
    pub fn score(&self, analyzer: &SentimentAnalyzer, sentences: &[Sentence]) -> Vec<ScoredParagraph> {
        let n = sentences.len();
        if n == 0 {
            return Vec::new();
        }
        // Short reviews become a single window; computed per call, never stored.
        let width = self.params.window_size.min(n);

        (0..=n - width)
            .step_by(self.params.step)
            .map(|start| score_window(analyzer, &sentences[start..start + width], start))
            .collect()
    }
}

fn score_window(analyzer: &SentimentAnalyzer, window: &[Sentence], start: usize) -> ScoredParagraph {
    let paragraph = paragraph_text(window);
    let (raw_score, word_count) = analyzer.score_text(&paragraph.to_lowercase());
    let normalized_score = if word_count == 0 {
        0.0
    } else {
        raw_score / word_count as f64
    };

    ScoredParagraph {
        paragraph,
        raw_score,
        normalized_score,
        word_count,
        review_id: None,
        window_start: start,
        sentences_in_window: window.len(),
    }
}

/// `["a", "b"]` → `"a. b."`
pub fn paragraph_text(window: &[Sentence]) -> String {
    let mut out = window
        .iter()
        .map(Sentence::as_str)
        .collect::<Vec<_>>()
        .join(". ");
    out.push('.');
    out
}

/// Validate parameters and score windows in one call.
pub fn score_windows(
    analyzer: &SentimentAnalyzer,
    sentences: &[Sentence],
    window_size: usize,
    step: usize,
) -> Result<Vec<ScoredParagraph>, InvalidWindowParameters> {
    let params = WindowParams::new(window_size, step)?;
    Ok(SlidingWindow::new(params).score(analyzer, sentences))
}

/// Top `n` windows by normalized score, highest first (stable on ties).
pub fn most_positive(windows: &[ScoredParagraph], n: usize) -> Vec<ScoredParagraph> {
    let mut sorted = windows.to_vec();
    sorted.sort_by(|a, b| descending(a.normalized_score, b.normalized_score));
    sorted.truncate(n);
    sorted
}

/// Top `n` windows by normalized score, lowest first (stable on ties).
pub fn most_negative(windows: &[ScoredParagraph], n: usize) -> Vec<ScoredParagraph> {
    let mut sorted = windows.to_vec();
    sorted.sort_by(|a, b| ascending(a.normalized_score, b.normalized_score));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::normalize::normalize;
    use std::sync::Arc;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::new(Arc::new(Lexicon::from_pairs([
            ("great", 3.0),
            ("bad", -2.0),
            ("awful", -4.0),
        ])))
    }

    #[test]
    fn two_sentences_one_window() {
        let s = normalize("This is great. This is bad.");
        let w = score_windows(&analyzer(), &s, 2, 1).unwrap();
        assert_eq!(w.len(), 1);
        let p = &w[0];
        assert_eq!(p.paragraph, "This is great. This is bad.");
        assert!((p.raw_score - 1.0).abs() < 1e-12);
        assert_eq!(p.word_count, 6);
        assert!((p.normalized_score - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(p.window_start, 0);
        assert_eq!(p.sentences_in_window, 2);
    }

    #[test]
    fn short_review_falls_back_to_single_window() {
        let s = normalize("great. bad");
        let w = score_windows(&analyzer(), &s, 5, 1).unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].sentences_in_window, 2);
    }

    #[test]
    fn offsets_follow_step() {
        let s = normalize("a. b. c. d. e. f.");
        let w = score_windows(&analyzer(), &s, 2, 2).unwrap();
        let starts: Vec<usize> = w.iter().map(|p| p.window_start).collect();
        assert_eq!(starts, vec![0, 2, 4]);

        let w = score_windows(&analyzer(), &s, 3, 2).unwrap();
        let starts: Vec<usize> = w.iter().map(|p| p.window_start).collect();
        assert_eq!(starts, vec![0, 2]);
    }

    #[test]
    fn zero_parameters_are_rejected() {
        let s = normalize("a. b.");
        assert!(score_windows(&analyzer(), &s, 0, 1).is_err());
        assert!(score_windows(&analyzer(), &s, 1, 0).is_err());
    }

    #[test]
    fn empty_input_has_no_windows() {
        assert!(score_windows(&analyzer(), &[], 3, 1).unwrap().is_empty());
    }

    #[test]
    fn window_score_uses_only_its_sentences() {
        let s = normalize("great. fine. awful.");
        let w = score_windows(&analyzer(), &s, 1, 1).unwrap();
        let raw: Vec<f64> = w.iter().map(|p| p.raw_score).collect();
        assert_eq!(raw, vec![3.0, 0.0, -4.0]);
    }

    #[test]
    fn rankings_are_ordered_and_stable() {
        let s = normalize("great. fine. okay. awful. great.");
        let w = score_windows(&analyzer(), &s, 1, 1).unwrap();

        let pos: Vec<usize> = most_positive(&w, 10).iter().map(|p| p.window_start).collect();
        assert_eq!(pos, vec![0, 4, 1, 2, 3]);

        let neg: Vec<usize> = most_negative(&w, 2).iter().map(|p| p.window_start).collect();
        assert_eq!(neg, vec![3, 1]);
    }

    #[test]
    fn rankings_survive_non_finite_scores() {
        let windows: Vec<ScoredParagraph> = (0..24)
            .map(|i| ScoredParagraph {
                paragraph: format!("w{i}."),
                raw_score: 0.0,
                normalized_score: match i % 4 {
                    0 => f64::NAN,
                    1 => f64::INFINITY,
                    _ => i as f64,
                },
                word_count: 1,
                review_id: None,
                window_start: i,
                sentences_in_window: 1,
            })
            .collect();

        let pos = most_positive(&windows, 24);
        assert_eq!(pos[0].window_start, 1);
        assert!(pos[23].normalized_score.is_nan());

        let neg = most_negative(&windows, 3);
        let starts: Vec<usize> = neg.iter().map(|p| p.window_start).collect();
        assert_eq!(starts, vec![2, 3, 6]);
    }
}
