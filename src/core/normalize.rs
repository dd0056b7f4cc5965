//! Normalization of raw model output.
//!
//! All leniency toward the external payload is decided here: prose replies,
//! markdown code fences, wrong-shaped JSON and individually unreadable
//! records. Only text that looks like JSON but does not parse is an error.

use crate::domain::model::Listing;
use crate::utils::error::{GemsError, Result};
use serde_json::Value;

const FENCE: &str = "```";
const LOG_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// A `properties` array was present; unreadable records were dropped.
    Listings(Vec<Listing>),
    /// The model answered in prose instead of JSON.
    NoResults,
    /// Valid JSON without a `properties` array.
    MissingProperties,
}

impl ResponseOutcome {
    pub fn into_listings(self) -> Vec<Listing> {
        match self {
            ResponseOutcome::Listings(listings) => listings,
            ResponseOutcome::NoResults | ResponseOutcome::MissingProperties => Vec::new(),
        }
    }
}

/// Removes a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = body.trim_end().strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

pub fn parse_response(raw: &str) -> Result<ResponseOutcome> {
    let cleaned = strip_code_fence(raw);

    if !cleaned.starts_with('{') {
        tracing::warn!(
            "Model returned a non-JSON response, treating as no results: {}",
            preview(cleaned)
        );
        return Ok(ResponseOutcome::NoResults);
    }

    let value: Value =
        serde_json::from_str(cleaned).map_err(|source| GemsError::Format { source })?;

    let items = match value {
        Value::Object(mut obj) => match obj.remove("properties") {
            Some(Value::Array(items)) => items,
            other => {
                tracing::error!(
                    "Unexpected JSON structure, no properties array (found {}): {}",
                    describe(other.as_ref()),
                    preview(cleaned)
                );
                return Ok(ResponseOutcome::MissingProperties);
            }
        },
        _ => {
            tracing::error!("Unexpected JSON structure: {}", preview(cleaned));
            return Ok(ResponseOutcome::MissingProperties);
        }
    };

    let total = items.len();
    let listings: Vec<Listing> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Listing>(item) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!("Skipping unreadable listing at index {}: {}", index, e);
                None
            }
        })
        .collect();

    if listings.len() < total {
        tracing::warn!("Kept {} of {} listings", listings.len(), total);
    }

    Ok(ResponseOutcome::Listings(listings))
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a boolean",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "an array",
        Some(Value::Object(_)) => "an object",
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= LOG_PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}…", head)
    }
}
