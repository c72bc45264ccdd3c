//! Documents accepted by the in-memory index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A document with an external identifier and named text fields.
///
/// Serialized as one flat JSON object: `{"id": "...", "body": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// External identifier, unique within the collection.
    pub id: String,
    /// Field name to raw text.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document without fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.insert(name.into(), text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_flat_json() {
        let doc: Document =
            serde_json::from_str(r#"{"id": "d1", "body": "zebra", "title": "lion"}"#).unwrap();
        assert_eq!(
            doc,
            Document::new("d1")
                .with_field("body", "zebra")
                .with_field("title", "lion")
        );
    }

    #[test]
    fn rejects_missing_id() {
        assert!(serde_json::from_str::<Document>(r#"{"body": "zebra"}"#).is_err());
    }
}
