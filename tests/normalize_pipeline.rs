// tests/normalize_pipeline.rs
//
// End-to-end checks for normalize → sentence scoring, plus a seeded fuzz
// pass over the normalizer's output invariants.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use review_sentiment_analyzer::normalize::{normalize, CARRIAGE_RETURN_ARTIFACT};
use review_sentiment_analyzer::{Lexicon, SentimentAnalyzer};

fn analyzer() -> SentimentAnalyzer {
    SentimentAnalyzer::new(Arc::new(Lexicon::from_pairs([("great", 3.0), ("bad", -2.0)])))
}

fn texts(raw: &str) -> Vec<String> {
    normalize(raw).into_iter().map(|s| s.into_string()).collect()
}

#[test]
fn two_sentence_review_scores_each_sentence() {
    let sentences = normalize("This is great. This is bad.");
    let scored = analyzer().score_sentences(&sentences);

    let got: Vec<(&str, f64)> = scored.iter().map(|s| (s.sentence.as_str(), s.score)).collect();
    assert_eq!(got, vec![("This is great", 3.0), ("This is bad", -2.0)]);
}

#[test]
fn spreadsheet_artifact_and_contraction() {
    assert_eq!(texts("Didn't like it_x000D_at all."), vec!["Did not like it at all"]);
}

#[test]
fn empty_review_yields_nothing_downstream() {
    let sentences = normalize("");
    assert!(sentences.is_empty());
    assert!(analyzer().score_sentences(&sentences).is_empty());
}

#[test]
fn multiline_review_with_artifacts() {
    let raw = "Great game!_x000D_\nI'd play it again...\r\nBut the ending isn't good";
    assert_eq!(
        texts(raw),
        vec!["Great game", "Id play it again", "But the ending is not good"]
    );
}

#[test]
fn sentence_scores_ignore_casing() {
    let scored = analyzer().score_sentences(&normalize("GREAT. Great. great."));
    assert!(scored.iter().all(|s| s.score == 3.0));
}

#[test]
fn normalize_is_deterministic() {
    let raw = "Wasn't bad -- honestly?! 9/10, would buy again.";
    assert_eq!(normalize(raw), normalize(raw));
}

const PIECES: &[&str] = &[
    "good", "Bad", "don't", "DIDN'T", "it's", "well-made", "10/10", "é", "日本",
    " ", "  ", "\t", ".", "...", "!", "?!", ",", ";", ":", "-", "'", "\"", "(", ")",
    "_x000D_", "\r\n", "\n", "*", "#", "😀",
];

fn random_review(rng: &mut StdRng) -> String {
    let n = rng.random_range(0..40);
    (0..n)
        .map(|_| PIECES[rng.random_range(0..PIECES.len())])
        .collect()
}

#[test]
fn fuzzed_sentences_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed_2024);

    for _ in 0..2_000 {
        let raw = random_review(&mut rng);
        let sentences = normalize(&raw);

        for s in &sentences {
            let t = s.as_str();
            assert!(!t.is_empty(), "empty sentence from {raw:?}");
            assert_eq!(t, t.trim(), "untrimmed sentence {t:?} from {raw:?}");
            assert!(!t.contains("  "), "double space in {t:?} from {raw:?}");
            assert!(
                !t.contains(['.', '!', '?', '\r', '\n', '-', '\'']),
                "leftover punctuation in {t:?} from {raw:?}"
            );
            assert!(!t.contains(CARRIAGE_RETURN_ARTIFACT), "artifact survived in {t:?}");
        }

        assert_eq!(sentences, normalize(&raw), "non-deterministic on {raw:?}");
    }
}
