use serde::{Deserialize, Serialize};

use crate::dao::models::CardRecord;

/// Card document as stored in the flat `cards` collection.
///
/// The seeding script writes one document per card with the owning topic in
/// `topicId`; audit timestamps are ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoCardDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub topic_id: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub requires_participant: Option<bool>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl From<MongoCardDocument> for (String, CardRecord) {
    fn from(document: MongoCardDocument) -> Self {
        (
            document.id,
            CardRecord {
                prompt: document.prompt,
                tone: document.tone,
                tags: document.tags,
                requires_participant: document.requires_participant,
                order: document.order,
            },
        )
    }
}
