// src/review.rs
use serde::{Deserialize, Deserializer, Serialize};

/// Characters kept in a review preview before `...` is appended.
pub const PREVIEW_CHARS: usize = 200;

/// One review as handed to the batch analyzer.
///
/// Only `id` and `text` are interpreted. Anything else (timestamps, vote
/// counts, purchase flags, ...) lands in `extra` and is passed through.
///
/// The text may arrive as `text`, `review` or `review_text`; the id may be a
/// JSON string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireReview")]
pub struct ReviewRecord {
    pub id: String,
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct WireReview {
    #[serde(deserialize_with = "id_from_string_or_number")]
    id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    review: Option<String>,
    #[serde(default)]
    review_text: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<WireReview> for ReviewRecord {
    fn from(w: WireReview) -> Self {
        Self {
            id: w.id,
            text: w.text.or(w.review).or(w.review_text),
            extra: w.extra,
        }
    }
}

impl ReviewRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Record with no text field at all.
    pub fn without_text(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
            extra: serde_json::Map::new(),
        }
    }
}

fn id_from_string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(de)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// First [`PREVIEW_CHARS`] characters, with `...` when the text was cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
