use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::column::ColumnId;

/// Unique identifier for a card
///
/// Ids are opaque strings assigned by the backend; locally created
/// cards get a fresh UUID until the backend echoes its own id back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    /// Generates a fresh id for a locally created card
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Derives the deterministic id of the placeholder card for a column
    pub fn placeholder_for(column_id: &ColumnId) -> Self {
        Self(format!("{}-placeholder", column_id.as_str()))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single task card owned by exactly one column
///
/// Only the order-relevant fields are typed. Everything else the
/// backend attaches to a card (description, cover image, due date,
/// labels, member references, attachment/comment counts, ...) is
/// carried through unmodified in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    /// Synthetic drop surface for an empty column; never persisted and
    /// never rendered
    #[serde(default, skip_serializing_if = "is_false")]
    pub placeholder: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a new card with the given id and title
    pub fn new(id: CardId, column_id: ColumnId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            column_id,
            title,
            placeholder: false,
            details: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthesizes the placeholder card for an empty column
    pub fn placeholder(column_id: &ColumnId) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::placeholder_for(column_id),
            column_id: column_id.clone(),
            title: String::new(),
            placeholder: true,
            details: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Returns an opaque detail field, if present
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Sets an opaque detail field
    pub fn set_detail(&mut self, key: impl Into<String>, value: Value) {
        self.details.insert(key.into(), value);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_generation_is_unique() {
        let a = CardId::new();
        let b = CardId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_placeholder_id_is_derived_from_column() {
        let column_id = ColumnId::from("col-7");
        let id = CardId::placeholder_for(&column_id);
        assert_eq!(id.as_str(), "col-7-placeholder");

        // Derivation is deterministic
        assert_eq!(id, CardId::placeholder_for(&column_id));
    }

    #[test]
    fn test_placeholder_card_is_flagged() {
        let column_id = ColumnId::from("col-1");
        let card = Card::placeholder(&column_id);

        assert!(card.placeholder);
        assert_eq!(card.column_id, column_id);
        assert_eq!(card.id, CardId::placeholder_for(&column_id));
    }

    #[test]
    fn test_new_card_is_not_a_placeholder() {
        let card = Card::new(
            CardId::from("c1"),
            ColumnId::from("col-1"),
            "Write tests".to_string(),
        );
        assert!(!card.placeholder);
        assert!(card.details.is_empty());
    }

    #[test]
    fn test_set_title_updates_updated_at() {
        let mut card = Card::new(CardId::from("c1"), ColumnId::from("col-1"), "Old".to_string());
        let initial_updated_at = card.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        card.set_title("New".to_string());

        assert_eq!(card.title, "New");
        assert!(card.updated_at > initial_updated_at);
    }

    #[test]
    fn test_details_round_trip_unmodified() {
        let mut card = Card::new(
            CardId::from("c1"),
            ColumnId::from("col-1"),
            "Ship it".to_string(),
        );
        card.set_detail("description", Value::String("a longer text".into()));
        card.set_detail("attachmentCount", Value::from(3));

        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();

        assert_eq!(back.detail("description"), card.detail("description"));
        assert_eq!(back.detail("attachmentCount"), Some(&Value::from(3)));
    }

    #[test]
    fn test_unknown_backend_fields_land_in_details() {
        let json = r#"{
            "id": "c9",
            "columnId": "col-2",
            "title": "From the backend",
            "memberIds": ["u1", "u2"],
            "cover": "https://example.com/cover.png",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id.as_str(), "c9");
        assert!(!card.placeholder);
        assert!(card.detail("memberIds").is_some());
        assert!(card.detail("cover").is_some());
    }

    #[test]
    fn test_placeholder_flag_is_omitted_when_false() {
        let card = Card::new(CardId::from("c1"), ColumnId::from("col-1"), "T".to_string());
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("placeholder"));

        let placeholder = Card::placeholder(&ColumnId::from("col-1"));
        let json = serde_json::to_string(&placeholder).unwrap();
        assert!(json.contains("\"placeholder\":true"));
    }
}
