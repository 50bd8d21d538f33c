//! Core data types for the storage layer.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Field name to value mapping of a card.
pub type FieldMap = BTreeMap<String, String>;

/// Length of generated card identifiers.
pub const GUID_LEN: usize = 10;

/// A stored card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identifier, unique within the store
    pub guid: String,

    /// Catalog key of the note type
    pub note_type: String,

    /// Field values keyed by field name
    #[serde(deserialize_with = "deserialize_fields")]
    pub fields: FieldMap,

    /// Tags in insertion order
    #[serde(default)]
    pub tags: Vec<String>,

    /// When this card was created
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,

    /// When this card was last updated
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parse a stored timestamp.
///
/// RFC 3339 is what the store writes. Timestamps without an offset
/// (`2024-05-01T10:20:30.123456`, as older libraries wrote them) are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

/// Field values are strings; other JSON values are kept as their JSON text
/// and `null` becomes an empty string.
fn deserialize_fields<'de, D>(deserializer: D) -> Result<FieldMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

impl Card {
    /// Generate a short random identifier.
    pub fn generate_guid() -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(GUID_LEN);
        token
    }

    /// Whether this card carries the same content as `note_type` + `fields`.
    pub fn same_content(&self, note_type: &str, fields: &FieldMap) -> bool {
        self.note_type == note_type && &self.fields == fields
    }
}

/// Builder for creating new cards.
#[derive(Debug, Clone)]
pub struct NewCard {
    /// Note type key
    pub note_type: String,

    /// Field values
    pub fields: FieldMap,

    /// Tags
    pub tags: Vec<String>,

    /// Optional caller-supplied identifier
    pub guid: Option<String>,
}

impl NewCard {
    pub fn new(note_type: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            note_type: note_type.into(),
            fields,
            tags: Vec::new(),
            guid: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }
}

/// Replacement values for an existing card.
///
/// Only the parts that are set are replaced.
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub fields: Option<FieldMap>,
    pub tags: Option<Vec<String>>,
}

impl CardUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: FieldMap) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Whether nothing would be replaced.
    pub fn is_empty(&self) -> bool {
        self.fields.is_none() && self.tags.is_none()
    }

    /// Apply this update to `card`, stamping `updated_at`.
    pub fn apply(&self, card: &mut Card, now: DateTime<Utc>) {
        if let Some(ref fields) = self.fields {
            card.fields = fields.clone();
        }
        if let Some(ref tags) = self.tags {
            card.tags = tags.clone();
        }
        card.updated_at = Some(now);
    }
}

/// Filter for querying cards.
///
/// All set predicates must hold for a card to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    /// Exact tag membership
    pub tag: Option<String>,

    /// Exact note type key
    pub note_type: Option<String>,

    /// Case-insensitive substring of any field value
    pub search: Option<String>,
}

impl CardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.note_type.is_none() && self.search.is_none()
    }

    pub fn matches(&self, card: &Card) -> bool {
        if let Some(ref tag) = self.tag {
            if !card.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(ref note_type) = self.note_type {
            if &card.note_type != note_type {
                return false;
            }
        }
        if let Some(ref term) = self.search {
            let needle = term.to_lowercase();
            if !card
                .fields
                .values()
                .any(|value| value.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(note_type: &str, front: &str, tags: &[&str]) -> Card {
        let mut fields = FieldMap::new();
        fields.insert("front".to_string(), front.to_string());
        fields.insert("back".to_string(), "x".to_string());
        Card {
            guid: Card::generate_guid(),
            note_type: note_type.to_string(),
            fields,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-05-01T10:20:30Z").unwrap();
        let naive = parse_timestamp("2024-05-01T10:20:30").unwrap();
        assert_eq!(rfc, naive);

        let micros = parse_timestamp("2024-05-01T10:20:30.123456").unwrap();
        assert_eq!(micros.timestamp_subsec_micros(), 123456);

        let offset = parse_timestamp("2024-05-01T12:20:30+02:00").unwrap();
        assert_eq!(offset, rfc);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_card_reads_naive_timestamp_and_non_string_fields() {
        let line = r#"{"guid":"g1","note_type":"vocab","fields":{"front":"dog","back":null,"rank":3,"seen":true},"tags":["animals"],"created_at":"2024-05-01T10:20:30.123456"}"#;
        let card: Card = serde_json::from_str(line).unwrap();

        assert_eq!(card.created_at, parse_timestamp("2024-05-01T10:20:30.123456Z").unwrap());
        assert!(card.updated_at.is_none());
        assert_eq!(card.fields.get("front").map(String::as_str), Some("dog"));
        assert_eq!(card.fields.get("back").map(String::as_str), Some(""));
        assert_eq!(card.fields.get("rank").map(String::as_str), Some("3"));
        assert_eq!(card.fields.get("seen").map(String::as_str), Some("true"));

        // Written back in RFC 3339 only.
        let written = serde_json::to_string(&card).unwrap();
        assert!(written.contains("\"created_at\":\"2024-05-01T10:20:30.123456Z\""));
    }

    #[test]
    fn test_card_rejects_bad_timestamp() {
        let line = r#"{"guid":"g1","note_type":"vocab","fields":{},"created_at":"soon"}"#;
        let err = serde_json::from_str::<Card>(line).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_generated_guid_shape() {
        let guid = Card::generate_guid();
        assert_eq!(guid.len(), GUID_LEN);
        assert!(guid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(guid, Card::generate_guid());
    }

    #[test]
    fn test_filter_builder() {
        let filter = CardFilter::new().tag("animals").note_type("vocab").search("Dog");
        assert_eq!(filter.tag.as_deref(), Some("animals"));
        assert_eq!(filter.note_type.as_deref(), Some("vocab"));
        assert_eq!(filter.search.as_deref(), Some("Dog"));
        assert!(!filter.is_empty());
        assert!(CardFilter::new().is_empty());
    }

    #[test]
    fn test_filter_predicates() {
        let dog = card("vocab", "Dog", &["animals"]);
        let cat = card("basic", "cat", &["animals", "pets"]);

        assert!(CardFilter::new().matches(&dog));
        assert!(CardFilter::new().tag("animals").matches(&cat));
        assert!(!CardFilter::new().tag("pets").matches(&dog));
        assert!(!CardFilter::new().tag("anim").matches(&dog));
        assert!(CardFilter::new().note_type("vocab").matches(&dog));
        assert!(!CardFilter::new().note_type("vocab").matches(&cat));
        assert!(CardFilter::new().search("dO").matches(&dog));
        assert!(!CardFilter::new().search("bird").matches(&dog));
        assert!(!CardFilter::new().tag("animals").note_type("basic").matches(&dog));
    }

    #[test]
    fn test_update_apply_only_touches_supplied_parts() {
        let mut target = card("vocab", "Dog", &["animals"]);
        let original_fields = target.fields.clone();
        let now = Utc::now();

        CardUpdate::new()
            .tags(vec!["mammals".to_string()])
            .apply(&mut target, now);

        assert_eq!(target.fields, original_fields);
        assert_eq!(target.tags, vec!["mammals".to_string()]);
        assert_eq!(target.updated_at, Some(now));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(CardUpdate::new().is_empty());
        assert!(!CardUpdate::new().tags(Vec::new()).is_empty());
        assert!(!CardUpdate::new().fields(FieldMap::new()).is_empty());
    }

    #[test]
    fn test_updated_at_omitted_until_set() {
        let fresh = card("vocab", "Dog", &[]);
        let json = serde_json::to_string(&fresh).unwrap();
        assert!(!json.contains("updated_at"));

        let parsed: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fresh);
    }
}
