//! Error types for the review sentiment pipeline.
//!
//! Only lexicon loading and window parameters can fail a caller. Problems with
//! a single review are reported as [`ReviewSkip`] and recovered at the batch
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexiconLoadError {
    #[error("cannot open lexicon source {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon source is unreadable: {0}")]
    Read(#[from] csv::Error),

    #[error("malformed lexicon row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("lexicon source has no usable rows ({skipped} malformed rows skipped)")]
    Empty { skipped: usize },
}

/// Window size and step must both be at least 1.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid window parameters: window_size={window_size}, step={step} (both must be >= 1)")]
pub struct InvalidWindowParameters {
    pub window_size: usize,
    pub step: usize,
}

/// Why a single review was left out of a batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSkip {
    #[error("review has no text field")]
    MissingText,

    #[error("review text is blank")]
    BlankText,

    #[error("review text produced no sentences")]
    NoSentences,

    #[error("review produced a non-finite score")]
    NonFiniteScore,
}

impl ReviewSkip {
    /// Stable label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewSkip::MissingText => "missing_text",
            ReviewSkip::BlankText => "blank_text",
            ReviewSkip::NoSentences => "no_sentences",
            ReviewSkip::NonFiniteScore => "non_finite_score",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lexicon(#[from] LexiconLoadError),

    #[error(transparent)]
    Window(#[from] InvalidWindowParameters),
}

pub type Result<T> = std::result::Result<T, Error>;
