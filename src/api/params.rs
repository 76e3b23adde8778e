//! Encoding for the backend's `params=` query value
//!
//! The gateway endpoints take a single comma-separated argument list in the
//! `params` query parameter. Rules:
//!
//! - items are joined with `,` in the order they were added
//! - raw items are written verbatim (task identifiers)
//! - quoted items are wrapped in single quotes (service call identifiers);
//!   the backend has no escape for `'`, so a quote inside the value is rejected
//! - context words (`request`, `user`) are written verbatim
//!
//! The rendered string is a plain query value: percent-encoding is left to the
//! HTTP client.

use super::error::NaumenError;

/// Context word naming the acting user
pub const USER: &str = "user";
/// Context word naming the current request
pub const REQUEST: &str = "request";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Raw(String),
    Quoted(String),
}

/// Ordered argument list rendered into a `params=` value
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    items: Vec<Item>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value verbatim
    pub fn raw(mut self, value: impl Into<String>) -> Self {
        self.items.push(Item::Raw(value.into()));
        self
    }

    /// Append a value wrapped in single quotes
    pub fn quoted(mut self, value: impl Into<String>) -> Self {
        self.items.push(Item::Quoted(value.into()));
        self
    }

    /// Append the `user` context word
    pub fn user(self) -> Self {
        self.raw(USER)
    }

    /// Append the `request` context word
    pub fn request(self) -> Self {
        self.raw(REQUEST)
    }

    /// Render the list, failing if a quoted value cannot be represented
    pub fn encode(&self, operation: &'static str) -> Result<String, NaumenError> {
        let mut rendered = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                Item::Raw(value) => rendered.push(value.clone()),
                Item::Quoted(value) => {
                    if value.contains('\'') {
                        return Err(NaumenError::request_construction(
                            operation,
                            format!("quoted parameter contains a single quote: {}", value),
                        ));
                    }
                    rendered.push(format!("'{}'", value));
                }
            }
        }
        Ok(rendered.join(","))
    }
}
