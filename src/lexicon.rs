//! # Lexicon Store
//!
//! Immutable word → valence mapping that drives every score in the crate.
//!
//! - Loads from a two-column `(word, score)` CSV file (header optional).
//! - Keys are lower-cased at load; lookups are case-insensitive.
//! - Unknown words (including the empty string) score `0.0`.
//! - Malformed rows are skipped or fatal depending on [`RowPolicy`].
//!
//! The lexicon is built once and shared read-only (typically behind an `Arc`).

use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt, fs, io,
    path::Path,
    str::FromStr,
};

use crate::error::LexiconLoadError;

/// Valence returned for words the lexicon does not know.
pub const NEUTRAL: f64 = 0.0;

/// What to do with a row that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Skip and count malformed rows; fail only if nothing usable remains.
    #[default]
    Skip,
    /// Abort on the first malformed row.
    Strict,
}

impl FromStr for RowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(RowPolicy::Skip),
            "strict" => Ok(RowPolicy::Strict),
            other => Err(format!("unknown row policy {other:?} (expected skip|strict)")),
        }
    }
}

#[derive(Clone, Default, PartialEq)]
pub struct Lexicon {
    scores: HashMap<String, f64>,
}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicon")
            .field("words", &self.scores.len())
            .finish()
    }
}

impl Lexicon {
    /// Build from in-memory pairs. Keys are lower-cased; later pairs win.
    ///
    /// Pairs that would not survive a file load (empty or multi-token words,
    /// non-finite scores) are dropped with a warning.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut scores = HashMap::new();
        for (word, score) in pairs {
            let word = word.as_ref();
            match validate_word(word).and_then(|w| finite(score, word).map(|v| (w, v))) {
                Ok((w, v)) => {
                    scores.insert(w, v);
                }
                Err(reason) => tracing::warn!(%reason, "dropping lexicon entry"),
            }
        }
        Self { scores }
    }

    /// Load a two-column CSV file.
    pub fn load<P: AsRef<Path>>(path: P, policy: RowPolicy) -> Result<Self, LexiconLoadError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| LexiconLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::from_csv_reader(io::BufReader::new(file), policy)?;

        tracing::info!(path = %path.display(), words = lexicon.len(), "lexicon loaded");
        Ok(lexicon)
    }

    /// Parse `(word, score)` rows from any CSV reader.
    ///
    /// The first row is treated as a header when its score column is not
    /// numeric. Extra columns are ignored.
    pub fn from_csv_reader<R: io::Read>(
        reader: R,
        policy: RowPolicy,
    ) -> Result<Self, LexiconLoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut builder = Builder::new(policy);
        for (i, row) in rdr.records().enumerate() {
            let fallback_line = i as u64 + 1;
            let record = match row {
                Ok(r) => r,
                // A single badly encoded row is recoverable; I/O failures are not.
                Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                    let line = e.position().map_or(fallback_line, |p| p.line());
                    builder.reject(line, format!("invalid UTF-8: {e}"))?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let line = record.position().map_or(fallback_line, |p| p.line());
            if i == 0 && looks_like_header(&record) {
                continue;
            }
            match parse_record(&record) {
                Ok((word, score)) => builder.insert(word, score),
                Err(reason) => builder.reject(line, reason)?,
            }
        }
        builder.finish()
    }

    /// Valence for `word`, or [`NEUTRAL`] when absent.
    #[inline]
    pub fn get(&self, word: &str) -> f64 {
        if word.chars().any(char::is_uppercase) {
            self.lookup(&word.to_lowercase())
        } else {
            self.lookup(word)
        }
    }

    #[inline]
    fn lookup(&self, word: &str) -> f64 {
        self.scores.get(word).copied().unwrap_or(NEUTRAL)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.scores.contains_key(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Accumulates rows and applies the malformed-row policy.
struct Builder {
    policy: RowPolicy,
    scores: HashMap<String, f64>,
    skipped: usize,
}

impl Builder {
    fn new(policy: RowPolicy) -> Self {
        Self {
            policy,
            scores: HashMap::new(),
            skipped: 0,
        }
    }

    fn insert(&mut self, word: String, score: f64) {
        self.scores.insert(word, score);
    }

    fn reject(&mut self, line: u64, reason: String) -> Result<(), LexiconLoadError> {
        match self.policy {
            RowPolicy::Strict => Err(LexiconLoadError::MalformedRow { line, reason }),
            RowPolicy::Skip => {
                tracing::debug!(line, %reason, "skipping malformed lexicon row");
                self.skipped += 1;
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<Lexicon, LexiconLoadError> {
        if self.scores.is_empty() {
            return Err(LexiconLoadError::Empty {
                skipped: self.skipped,
            });
        }
        if self.skipped > 0 {
            tracing::warn!(
                skipped = self.skipped,
                kept = self.scores.len(),
                "malformed lexicon rows skipped"
            );
        }
        Ok(Lexicon {
            scores: self.scores,
        })
    }
}

fn looks_like_header(record: &csv::StringRecord) -> bool {
    record.len() >= 2 && record[1].parse::<f64>().is_err()
}

fn parse_record(record: &csv::StringRecord) -> Result<(String, f64), String> {
    if record.len() < 2 {
        return Err(format!("expected 2 fields, found {}", record.len()));
    }
    let word = validate_word(&record[0])?;
    let raw = &record[1];
    let score: f64 = raw
        .parse()
        .map_err(|_| format!("score {raw:?} is not a number"))?;
    let score = finite(score, &word)?;
    Ok((word, score))
}

fn finite(score: f64, word: &str) -> Result<f64, String> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(format!("score for {word:?} is not finite"))
    }
}

/// A lexicon key is a single non-empty token without whitespace.
fn validate_word(raw: &str) -> Result<String, String> {
    let word = raw.trim_start_matches('\u{feff}').trim();
    if word.is_empty() {
        return Err("empty word".to_string());
    }
    if word.chars().any(char::is_whitespace) {
        return Err(format!("word {word:?} contains whitespace"));
    }
    Ok(word.to_lowercase())
}
