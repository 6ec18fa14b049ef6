//! Toolkit commands for encoding, decoding and inspecting ABI data
//!
//! Each command returns a [`ToolResult`] on success and a printable message on
//! failure; the caller decides how to render either.

pub mod decode;
pub mod encode;
pub mod format;
pub mod selector;

use std::fmt;

/// Result of a toolkit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub title: String,
    pub content: Vec<(String, String)>, // (label, value) pairs
}

impl ToolResult {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
        }
    }

    pub fn add(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.push((label.into(), value.into()));
        self
    }

    /// Value of the first row with `label`
    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.content
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self.content.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (label, value) in &self.content {
            writeln!(f, "  {:<width$}  {}", label, value, width = width)?;
        }
        Ok(())
    }
}

/// Strip an optional `0x` prefix and decode hex
pub(crate) fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(payload).map_err(|e| format!("Invalid hex: {}", e))
}
