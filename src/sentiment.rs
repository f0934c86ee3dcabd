use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::normalize::Sentence;

/// Sentence text paired with its raw valence sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    pub sentence: String,
    pub score: f64,
    /// 0-based position of the sentence within its review.
    pub position: usize,
}

/// Scores text against a shared, read-only lexicon.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<Lexicon>,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns `(score, word count)`.
    ///
    /// Words are whitespace-separated tokens with surrounding periods trimmed,
    /// so a paragraph rebuilt as `"a b. c d."` scores the same words as its
    /// sentences. Lookups are case-insensitive.
    pub fn score_text(&self, text: &str) -> (f64, usize) {
        words(text).fold((0.0, 0), |(score, n), w| (score + self.lexicon.get(w), n + 1))
    }

    /// Score every sentence, keeping input order.
    pub fn score_sentences(&self, sentences: &[Sentence]) -> Vec<ScoredSentence> {
        sentences
            .iter()
            .enumerate()
            .map(|(position, s)| ScoredSentence {
                sentence: s.as_str().to_string(),
                score: self.score_text(s.as_str()).0,
                position,
            })
            .collect()
    }
}

/// Word tokens of `text` as used for scoring.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split_whitespace()
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
}

/// Highest score first; equal scores keep their original order.
pub fn rank_sentences(scored: &[ScoredSentence]) -> Vec<ScoredSentence> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| descending(a.score, b.score));
    ranked
}

/// Highest first. A total order: `-0.0 == 0.0` and NaN sorts last, so
/// sorts using it are stable and never panic.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    sort_key(b, f64::NEG_INFINITY).total_cmp(&sort_key(a, f64::NEG_INFINITY))
}

/// Lowest first, NaN last.
pub(crate) fn ascending(a: f64, b: f64) -> Ordering {
    sort_key(a, f64::INFINITY).total_cmp(&sort_key(b, f64::INFINITY))
}

fn sort_key(x: f64, nan_as: f64) -> f64 {
    if x.is_nan() {
        nan_as
    } else if x == 0.0 {
        0.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::new(Arc::new(Lexicon::from_pairs([
            ("great", 3.0),
            ("bad", -2.0),
        ])))
    }

    #[test]
    fn scores_each_sentence() {
        let a = analyzer();
        let scored = a.score_sentences(&normalize("This is great. This is bad."));
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].sentence, "This is great");
        assert_eq!(scored[0].score, 3.0);
        assert_eq!(scored[1].sentence, "This is bad");
        assert_eq!(scored[1].score, -2.0);
    }

    #[test]
    fn score_text_counts_words_and_trims_periods() {
        let a = analyzer();
        let (score, n) = a.score_text("This is great. This is bad.");
        assert_eq!(n, 6);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn casing_does_not_change_scores() {
        let a = analyzer();
        assert_eq!(a.score_text("GREAT").0, a.score_text("great").0);
    }

    #[test]
    fn empty_input_scores_nothing() {
        let a = analyzer();
        assert!(a.score_sentences(&[]).is_empty());
        assert_eq!(a.score_text(""), (0.0, 0));
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let a = analyzer();
        let scored = a.score_sentences(&normalize("ok. great. fine. bad. great"));
        let ranked = rank_sentences(&scored);
        let order: Vec<usize> = ranked.iter().map(|s| s.position).collect();
        assert_eq!(order, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn comparators_are_total_with_nan_and_signed_zero() {
        let mut xs = vec![1.0, f64::NAN, -0.0, 0.0, -3.0, f64::NAN, 2.0];
        xs.sort_by(|a, b| descending(*a, *b));
        assert_eq!(&xs[..5], &[2.0, 1.0, -0.0, 0.0, -3.0]);
        assert!(xs[5].is_nan() && xs[6].is_nan());
        // signed zeros keep their input order
        assert!(xs[2].is_sign_negative() && xs[3].is_sign_positive());

        xs.sort_by(|a, b| ascending(*a, *b));
        assert_eq!(xs[0], -3.0);
        assert!(xs[5].is_nan() && xs[6].is_nan());
    }
}
