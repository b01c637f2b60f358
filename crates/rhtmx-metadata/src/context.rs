// File: src/context.rs
// Purpose: Request context handed to the validator

use std::collections::HashMap;

/// Ambient request data the validator may consult.
///
/// Only headers matter today: they select metadata variants and feed
/// header-bound fields. Header names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    headers: HashMap<String, String>,
}

impl ValidationContext {
    /// Context without any request data
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from header name/value pairs
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self { headers }
    }

    /// Add or replace a header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }
}
