use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ItemId, ListId};
use crate::error::ApiError;

/// Longest accepted list name or item label, in bytes after trimming.
pub const MAX_TEXT_BYTES: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListResponse {
    pub id: ListId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToDoItemUpdate {
    pub item_id: ItemId,
    pub checked_state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyResponse {
    pub id: String,
    pub when: DateTime<Utc>,
}

// Route paths as URL segments below the API base. An id always stays a single
// segment, whatever characters it holds.

pub fn lists_path() -> Vec<&'static str> {
    vec!["api", "lists"]
}

pub fn list_path(list_id: &ListId) -> Vec<&str> {
    vec!["api", "lists", list_id.as_str()]
}

/// Ends with an empty segment: the item collection is served at `items/`.
pub fn items_path(list_id: &ListId) -> Vec<&str> {
    vec!["api", "lists", list_id.as_str(), "items", ""]
}

pub fn item_path<'a>(list_id: &'a ListId, item_id: &'a ItemId) -> Vec<&'a str> {
    vec!["api", "lists", list_id.as_str(), "items", item_id.as_str()]
}

pub fn checked_state_path(list_id: &ListId) -> Vec<&str> {
    vec!["api", "lists", list_id.as_str(), "checked_state"]
}

/// Trims a list name or item label and rejects empty or oversized text.
pub fn validate_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_TEXT_BYTES {
        return Err(ApiError::validation(format!(
            "{field} exceeds {MAX_TEXT_BYTES} bytes"
        )));
    }
    Ok(value)
}
