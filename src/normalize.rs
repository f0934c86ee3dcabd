//! # Text Normalizer
//!
//! Turns one raw review into an ordered list of cleaned [`Sentence`]s:
//!
//! 1. Replace spreadsheet carriage-return artifacts (`_x000D_`) and raw line
//!    breaks with spaces.
//! 2. Split on runs of `.`, `!`, `?` (`...` and `?!` are one delimiter).
//! 3. Trim fragments, drop empty ones.
//! 4. Hyphens become spaces, everything except letters, digits, whitespace
//!    and `:` is removed, contractions are expanded.
//! 5. Whitespace is collapsed; fragments that end up empty are dropped.
//!
//! Pure and deterministic: the same input always yields the same sentences.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::{borrow::Cow, collections::HashMap, fmt};

/// Literal artifact left behind by spreadsheet exports of `\r`.
pub const CARRIAGE_RETURN_ARTIFACT: &str = "_x000D_";

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence break regex"));

/// One cleaned sentence. Never empty, never contains sentence punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sentence(String);

impl Sentence {
    /// Clean a single fragment. `None` if nothing is left afterwards.
    pub fn clean(fragment: &str) -> Option<Self> {
        let stripped: String = fragment
            .chars()
            .map(|c| if c == '-' { ' ' } else { c })
            .filter(|&c| c.is_alphanumeric() || c.is_whitespace() || c == ':')
            .collect();

        let words: Vec<Cow<'_, str>> = stripped.split_whitespace().map(expand_contraction).collect();
        let text = words.join(" ");
        // An expansion never introduces leading/trailing space, so `join` is already collapsed.
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn words(&self) -> std::str::SplitWhitespace<'_> {
        self.0.split_whitespace()
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw review into its sentences.
pub fn normalize(raw: &str) -> Vec<Sentence> {
    let text = strip_artifacts(raw);
    fragments(&text).filter_map(Sentence::clean).collect()
}

/// Raw sentence fragments, trimmed and non-empty, before token cleaning.
pub fn fragments(text: &str) -> impl Iterator<Item = &str> + '_ {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|f| !f.is_empty())
}

/// Replace `_x000D_`, `\r` and `\n` with spaces. Borrows when there is nothing to do.
pub fn strip_artifacts(raw: &str) -> Cow<'_, str> {
    if !raw.contains(CARRIAGE_RETURN_ARTIFACT) && !raw.contains(['\r', '\n']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace(CARRIAGE_RETURN_ARTIFACT, " ")
            .replace(['\r', '\n'], " "),
    )
}

/// Contractions keyed by their apostrophe-less lower-case form, because
/// punctuation stripping runs first. Forms that are also ordinary words
/// ("its", "were", "well", "ill", "hell", ...) are deliberately absent.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("aint", "are not"),
    ("arent", "are not"),
    ("cant", "cannot"),
    ("couldnt", "could not"),
    ("couldve", "could have"),
    ("didnt", "did not"),
    ("doesnt", "does not"),
    ("dont", "do not"),
    ("hadnt", "had not"),
    ("hasnt", "has not"),
    ("havent", "have not"),
    ("hes", "he is"),
    ("howd", "how did"),
    ("howll", "how will"),
    ("hows", "how is"),
    ("im", "I am"),
    ("isnt", "is not"),
    ("itll", "it will"),
    ("ive", "I have"),
    ("mightnt", "might not"),
    ("mightve", "might have"),
    ("mustnt", "must not"),
    ("mustve", "must have"),
    ("neednt", "need not"),
    ("shant", "shall not"),
    ("shes", "she is"),
    ("shouldnt", "should not"),
    ("shouldve", "should have"),
    ("thats", "that is"),
    ("theres", "there is"),
    ("theyd", "they would"),
    ("theyll", "they will"),
    ("theyre", "they are"),
    ("theyve", "they have"),
    ("wasnt", "was not"),
    ("weve", "we have"),
    ("werent", "were not"),
    ("whatll", "what will"),
    ("whatre", "what are"),
    ("whats", "what is"),
    ("whatve", "what have"),
    ("whens", "when is"),
    ("wheres", "where is"),
    ("whod", "who would"),
    ("wholl", "who will"),
    ("whos", "who is"),
    ("whove", "who have"),
    ("whys", "why is"),
    ("wont", "will not"),
    ("wouldnt", "would not"),
    ("wouldve", "would have"),
    ("yall", "you all"),
    ("youd", "you would"),
    ("youll", "you will"),
    ("youre", "you are"),
    ("youve", "you have"),
    ("gonna", "going to"),
    ("gotta", "got to"),
    ("wanna", "want to"),
];

static CONTRACTION_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CONTRACTIONS.iter().copied().collect());

/// Expand one token, mirroring its casing (`Didnt` → `Did not`, `DONT` → `DO NOT`).
pub fn expand_contraction(token: &str) -> Cow<'_, str> {
    let lower = token.to_lowercase();
    let Some(&expansion) = CONTRACTION_TABLE.get(lower.as_str()) else {
        return Cow::Borrowed(token);
    };

    let mut chars = token.chars();
    let first_upper = chars.next().is_some_and(char::is_uppercase);
    let all_upper = first_upper && token.chars().count() > 1 && token.chars().all(char::is_uppercase);

    if all_upper {
        Cow::Owned(expansion.to_uppercase())
    } else if first_upper {
        let mut out = String::with_capacity(expansion.len());
        let mut exp = expansion.chars();
        if let Some(c) = exp.next() {
            out.extend(c.to_uppercase());
        }
        out.push_str(exp.as_str());
        Cow::Owned(out)
    } else {
        Cow::Borrowed(expansion)
    }
}
