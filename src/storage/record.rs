//! Record - Opaque Caller-Schema Data
//!
//! `TigerStyle`: The router and backends never interpret record contents.
//! A record is a JSON object whose schema belongs to the caller; the only
//! field with meaning here is the identifier assigned at persistence time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding a record's identifier once persisted.
pub const RECORD_ID_FIELD: &str = "id";

// =============================================================================
// Record
// =============================================================================

/// An opaque mapping from field name to JSON value.
///
/// No validation is performed on field names or values. Backends round-trip
/// records byte-for-byte apart from the identifier they assign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object value.
    ///
    /// Returns None if the value is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Set a field, replacing any existing value. Builder-style.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a field in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a field as a string slice.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Get the record's identifier, if persisted.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str(RECORD_ID_FIELD)
    }

    /// Remove a field, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Check whether a field is present.
    #[must_use]
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Merge another record's fields into this one, overwriting on conflict.
    pub fn merge(&mut self, other: &Record) {
        for (name, value) in other.iter() {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    /// Check that every field of `other` is present here with an equal value.
    #[must_use]
    pub fn is_superset_of(&self, other: &Record) -> bool {
        other
            .iter()
            .all(|(name, value)| self.fields.get(name) == Some(value))
    }

    /// Consume into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

// =============================================================================
// Document
// =============================================================================

/// One enumerated document from a document-store collection.
///
/// The id comes from the store's own document naming; it is the value that
/// migration carries over as `firebase_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier within its collection
    pub id: String,
    /// Document contents
    pub data: Record,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(id: impl Into<String>, data: Record) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_get() {
        let record = Record::new()
            .with_field("name", "Ana")
            .with_field("score", 7);

        assert_eq!(record.get_str("name"), Some("Ana"));
        assert_eq!(record.get("score"), Some(&json!(7)));
        assert!(record.get("missing").is_none());
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_id_field() {
        let record = Record::new().with_field("name", "Ana");
        assert!(record.id().is_none());

        let record = record.with_field(RECORD_ID_FIELD, "abc-123");
        assert_eq!(record.id(), Some("abc-123"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!({"a": 1})).is_some());
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("str")).is_none());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = Record::new().with_field("a", 1).with_field("b", 2);
        let patch = Record::new().with_field("b", 20).with_field("c", 3);

        base.merge(&patch);

        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(base.get("b"), Some(&json!(20)));
        assert_eq!(base.get("c"), Some(&json!(3)));
    }

    #[test]
    fn test_superset() {
        let supplied = Record::new().with_field("name", "Ana");
        let stored = supplied.clone().with_field("id", "x-1");

        assert!(stored.is_superset_of(&supplied));
        assert!(!supplied.is_superset_of(&stored));
    }

    #[test]
    fn test_serde_transparent() {
        let record = Record::new().with_field("mood", "calm");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"mood":"calm"}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
