//! Request and response bodies of the HTTP API.

pub mod interactions;
pub mod maintenance;
pub mod people;
pub mod users;

use serde::Deserialize;

/// Optional free-text update: absent keeps the value, an empty string clears it.
pub(crate) fn apply_text(target: &mut Option<String>, update: Option<String>) {
    if let Some(value) = update {
        let value = value.trim();
        *target = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

/// `?q=` text search shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
