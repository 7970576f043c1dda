use serde::{Deserialize, Serialize};

/// Prompt text substituted when a card record carries none.
pub const FALLBACK_PROMPT: &str = "Carta sin descripción";
/// Tone label substituted when a card record carries none.
pub const FALLBACK_TONE: &str = "relajada";

/// Raw card document shape as stored in the remote collection.
///
/// Every field is optional at the source; audit fields written by the seeding
/// script (`topicId`, `createdAt`, `updatedAt`) are ignored on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CardRecord {
    /// Display text of the prompt.
    pub prompt: Option<String>,
    /// Free-text classification label.
    pub tone: Option<String>,
    /// Free-text labels, source display order preserved.
    pub tags: Option<Vec<String>>,
    /// Whether the card needs a second participant.
    pub requires_participant: Option<bool>,
    /// Position within the topic; absent values sort last.
    pub order: Option<i64>,
}

/// Canonical normalized prompt unit handed to the cache and deck layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Opaque unique identifier within its topic.
    pub id: String,
    /// Non-empty display text.
    pub prompt: String,
    /// Classification label, [`FALLBACK_TONE`] when the record had none.
    pub tone: String,
    /// Labels in source display order, empty when the record had none.
    pub tags: Vec<String>,
    /// Whether the card needs a second participant.
    pub requires_participant: bool,
    /// Position within the topic, `None` when the record had none.
    pub order: Option<i64>,
}

impl Card {
    /// Normalize one raw record into the canonical card shape.
    ///
    /// This is the single place where field defaults are applied; backends
    /// must not coerce fields on their own.
    pub fn from_record(id: impl Into<String>, record: CardRecord) -> Self {
        let prompt = match record.prompt {
            Some(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_PROMPT.to_owned(),
        };

        Self {
            id: id.into(),
            prompt,
            tone: record.tone.unwrap_or_else(|| FALLBACK_TONE.to_owned()),
            tags: record.tags.unwrap_or_default(),
            requires_participant: record.requires_participant.unwrap_or(false),
            order: record.order,
        }
    }
}

/// Map raw records (in retrieval order) into the canonical ordered sequence.
///
/// Sorts ascending by `order` with absent values treated as the maximum
/// sentinel; the sort is stable so records without an order keep their
/// relative retrieval order.
pub fn normalize_cards(records: Vec<(String, CardRecord)>) -> Vec<Card> {
    let mut cards: Vec<Card> = records
        .into_iter()
        .map(|(id, record)| Card::from_record(id, record))
        .collect();

    cards.sort_by_key(|card| card.order.unwrap_or(i64::MAX));
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prompt: &str, order: Option<i64>) -> CardRecord {
        CardRecord {
            prompt: Some(prompt.to_owned()),
            order,
            ..CardRecord::default()
        }
    }

    #[test]
    fn missing_prompt_falls_back() {
        let card = Card::from_record("c1", CardRecord::default());
        assert_eq!(card.prompt, FALLBACK_PROMPT);
        assert_eq!(card.tone, FALLBACK_TONE);
        assert!(card.tags.is_empty());
        assert!(!card.requires_participant);
        assert_eq!(card.order, None);
    }

    #[test]
    fn blank_prompt_falls_back() {
        let card = Card::from_record(
            "c1",
            CardRecord {
                prompt: Some("   ".into()),
                ..CardRecord::default()
            },
        );
        assert_eq!(card.prompt, FALLBACK_PROMPT);
    }

    #[test]
    fn explicit_fields_are_preserved() {
        let card = Card::from_record(
            "amor-003",
            CardRecord {
                prompt: Some("¿Qué fantasía te gustaría explorar?".into()),
                tone: Some("picante".into()),
                tags: Some(vec!["intimidad".into(), "novedad".into()]),
                requires_participant: Some(true),
                order: Some(2),
            },
        );
        assert_eq!(card.tone, "picante");
        assert_eq!(card.tags, vec!["intimidad", "novedad"]);
        assert!(card.requires_participant);
        assert_eq!(card.order, Some(2));
    }

    #[test]
    fn sorts_by_order_ascending() {
        let cards = normalize_cards(vec![
            ("b".into(), record("segunda", Some(4))),
            ("a".into(), record("primera", Some(0))),
            ("c".into(), record("tercera", Some(7))),
        ]);
        let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_order_sorts_last_in_retrieval_order() {
        let cards = normalize_cards(vec![
            ("x".into(), record("sin orden", None)),
            ("b".into(), record("segunda", Some(1))),
            ("y".into(), record("también sin orden", None)),
            ("a".into(), record("primera", Some(0))),
        ]);
        let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "x", "y"]);
    }
}
