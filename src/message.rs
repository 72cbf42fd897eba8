// src/message.rs
//! Chat message records, category labels, and the sender-name directory.
//!
//! Records come from the upstream ingestion store as a JSON array. Each element is
//! decoded on its own so one corrupt record never blocks the rest of the batch.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Classifier verdict for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Order", alias = "order")]
    Order,
    #[serde(rename = "Offer", alias = "offer")]
    Offer,
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Order => "Order",
            Category::Offer => "Offer",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    /// Lenient: anything that is not an order/offer label is `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "order" => Category::Order,
            "offer" => Category::Offer,
            _ => Category::Unknown,
        })
    }
}

/// One stored chat message. `category == None` means the label was never set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "string_or_number")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    /// Display-only. Known formats are rendered as RFC 3339; anything else is kept verbatim.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
}

impl Message {
    /// Convenience constructor used by tests and the HTTP layer.
    pub fn new(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            message: text.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Translated text when present and non-empty, otherwise the raw text.
    pub fn effective_text(&self) -> &str {
        match self.translated.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.message,
        }
    }

    /// Sender identifier, if the record carries a usable one.
    pub fn sender(&self) -> Option<&str> {
        self.number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

fn string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// RFC 3339, naive UTC date-times and epoch milliseconds are canonicalised to RFC 3339.
pub fn canonical_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return t.to_rfc3339();
    }
    for fmt in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return t.and_utc().to_rfc3339();
        }
    }
    if let Some(t) = trimmed
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        return t.to_rfc3339();
    }
    raw.to_string()
}

fn lenient_timestamp<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(de)?
        .filter(|s| !s.trim().is_empty())
        .map(|s| canonical_timestamp(&s)))
}

fn lenient_category<'de, D>(de: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| s.parse().ok()))
}

/// Decode raw records one by one, skipping (and logging) those that fail to decode.
pub fn decode_messages(rows: Vec<Value>) -> Vec<Message> {
    let total = rows.len();
    let mut out = Vec::with_capacity(total);
    for (idx, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<Message>(row) {
            Ok(m) => out.push(m),
            Err(e) => warn!(index = idx, error = %e, "skipping malformed message record"),
        }
    }
    if out.len() < total {
        warn!(kept = out.len(), total, "batch contained malformed message records");
    }
    out
}

/// Decode a JSON array of messages; only a non-array document is an error.
pub fn parse_messages(json: &str) -> Result<Vec<Message>> {
    let rows: Vec<Value> = serde_json::from_str(json).context("message store is not a JSON array")?;
    Ok(decode_messages(rows))
}

pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading message store from {}", path.display()))?;
    let messages = parse_messages(&content)?;
    info!(count = messages.len(), path = %path.display(), "messages loaded");
    Ok(messages)
}

/// Split labeled messages into (orders, offers); other labels are ignored.
pub fn split_by_category(messages: Vec<Message>) -> (Vec<Message>, Vec<Message>) {
    let mut orders = Vec::new();
    let mut offers = Vec::new();
    for m in messages {
        match m.category {
            Some(Category::Order) => orders.push(m),
            Some(Category::Offer) => offers.push(m),
            _ => {}
        }
    }
    (orders, offers)
}

/// Phone-number-like sender id -> display name.
#[derive(Debug, Clone, Default)]
pub struct SenderDirectory {
    names: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    number: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl SenderDirectory {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<Value> =
            serde_json::from_str(json).context("sender directory is not a JSON array")?;
        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let Ok(entry) = serde_json::from_value::<DirectoryEntry>(row) else {
                continue;
            };
            let number = entry.number.unwrap_or_default().trim().to_string();
            if number.is_empty() {
                continue;
            }
            names.insert(number, entry.name.unwrap_or_default());
        }
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sender directory from {}", path.display()))?;
        let dir = Self::from_json_str(&content)?;
        info!(entries = dir.len(), "sender directory loaded");
        Ok(dir)
    }

    /// Missing or unreadable file yields an empty directory (names fall back to "").
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "sender directory unavailable; display names will be empty");
                Self::default()
            }
        }
    }

    pub fn lookup(&self, number: &str) -> Option<&str> {
        self.names.get(number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<HashMap<String, String>> for SenderDirectory {
    fn from(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let json = r#"[
            {"number": "+39 333 1", "message": "need kelly", "category": "order"},
            {"number": "+39 333 2", "message": {"text": "x"}},
            {"number": 393332, "message": "selling kelly", "category": "Offer", "price": 1900}
        ]"#;
        let msgs = parse_messages(json).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].category, Some(Category::Order));
        assert_eq!(msgs[1].number.as_deref(), Some("393332"));
        assert_eq!(msgs[1].price.as_deref(), Some("1900"));
    }

    #[test]
    fn timestamps_in_store_formats_are_kept() {
        let json = r#"[
            {"number": "1", "message": "need kelly", "timestamp": "2025-03-01 09:15:00"},
            {"number": "2", "message": "need kelly", "timestamp": 1740820500000},
            {"number": "3", "message": "need kelly", "timestamp": "2025-03-01T09:15:00Z"},
            {"number": "4", "message": "need kelly", "timestamp": "yesterday"},
            {"number": "5", "message": "need kelly", "timestamp": null}
        ]"#;
        let msgs = parse_messages(json).unwrap();
        assert_eq!(msgs.len(), 5);
        let stamps: Vec<_> = msgs.iter().map(|m| m.timestamp.as_deref()).collect();
        assert_eq!(
            stamps,
            [
                Some("2025-03-01T09:15:00+00:00"),
                Some("2025-03-01T09:15:00+00:00"),
                Some("2025-03-01T09:15:00+00:00"),
                Some("yesterday"),
                None,
            ]
        );
    }

    #[test]
    fn effective_text_prefers_non_empty_translation() {
        let mut m = Message::new("1", "cerco kelly");
        assert_eq!(m.effective_text(), "cerco kelly");
        m.translated = Some("   ".into());
        assert_eq!(m.effective_text(), "cerco kelly");
        m.translated = Some("looking for kelly".into());
        assert_eq!(m.effective_text(), "looking for kelly");
    }

    #[test]
    fn category_labels_are_lenient() {
        let json = r#"[{"number":"1","category":"non-product"},{"number":"2","category":""},{"number":"3"}]"#;
        let msgs = parse_messages(json).unwrap();
        assert_eq!(msgs[0].category, Some(Category::Unknown));
        assert_eq!(msgs[1].category, None);
        assert_eq!(msgs[2].category, None);
    }

    #[test]
    fn directory_skips_blank_numbers() {
        let dir = SenderDirectory::from_json_str(
            r#"[{"number":" ","name":"ghost"},{"number":"44","name":"Anna"},{"name":"nobody"}]"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.lookup("44"), Some("Anna"));
        assert_eq!(dir.lookup("45"), None);
    }
}
