//! Wire models for the Firestore REST document surface.

use std::collections::HashMap;

use serde::Deserialize;

use crate::dao::models::CardRecord;

/// Response of a `documents.list` call on a card collection.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// One Firestore document with its typed field map.
#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name; the document id is the last path segment.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Firestore's externally tagged value encoding.
///
/// Integers arrive as JSON strings (`{"integerValue": "3"}`); only the value
/// kinds that can appear in a card document are modelled.
#[derive(Debug, Clone, Deserialize)]
pub enum FirestoreValue {
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(serde_json::Value),
}

/// Payload of an `arrayValue` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

impl FirestoreValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            FirestoreValue::String(value) => Some(value),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            FirestoreValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            FirestoreValue::Integer(value) => value.parse().ok(),
            FirestoreValue::Double(value) => Some(*value as i64),
            _ => None,
        }
    }
}

impl FirestoreDocument {
    /// Document id extracted from the resource name.
    pub fn document_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Convert the typed field map into the raw record shape.
    ///
    /// Type mismatches degrade to absent fields so a malformed document never
    /// fails the whole collection read; the canonical defaults are applied
    /// later by the shared normalization.
    pub fn into_record(self) -> (String, CardRecord) {
        let id = self.document_id().to_owned();

        let prompt = self
            .fields
            .get("prompt")
            .and_then(FirestoreValue::as_str)
            .map(str::to_owned);
        let tone = self
            .fields
            .get("tone")
            .and_then(FirestoreValue::as_str)
            .map(str::to_owned);
        let tags = match self.fields.get("tags") {
            Some(FirestoreValue::Array(array)) => Some(
                array
                    .values
                    .iter()
                    .filter_map(FirestoreValue::as_str)
                    .map(str::to_owned)
                    .collect(),
            ),
            _ => None,
        };
        let requires_participant = self
            .fields
            .get("requiresParticipant")
            .and_then(FirestoreValue::as_bool);
        let order = self.fields.get("order").and_then(FirestoreValue::as_integer);

        (
            id,
            CardRecord {
                prompt,
                tone,
                tags,
                requires_participant,
                order,
            },
        )
    }
}
