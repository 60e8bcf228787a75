use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved snippet. Field names match the stored JSON (`savedAt` in epoch millis).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id: String,
    pub description: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
}

impl PromptRecord {
    /// Build a new record with a fresh id. Callers validate the fields first.
    ///
    /// `saved_at` is cut to whole milliseconds, the precision it is stored with.
    pub fn new(description: &str, text: &str, source: &str, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            text: text.to_string(),
            saved_at: saved_at.trunc_subsecs(3),
            source: source.to_string(),
        }
    }

    /// Length of the body in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Newest-first sequence of records.
pub type PromptLibrary = Vec<PromptRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_with_stored_field_names() {
        let saved_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let record = PromptRecord {
            id: "1700000000123".to_string(),
            description: "Blog".to_string(),
            text: "Write a post".to_string(),
            saved_at,
            source: "example.com".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["savedAt"], 1_700_000_000_123i64);
        assert_eq!(value["source"], "example.com");
        assert!(value.get("saved_at").is_none());
    }

    #[test]
    fn test_missing_source_defaults_to_empty() {
        let json = r#"{"id":"a","description":"d","text":"t","savedAt":0}"#;
        let record: PromptRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.source, "");
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let now = Utc::now();
        let a = PromptRecord::new("a", "b", "here", now);
        let b = PromptRecord::new("a", "b", "here", now);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_saved_at_survives_storage_unchanged() {
        let precise = Utc.timestamp_nanos(1_700_000_000_123_456_789);
        let record = PromptRecord::new("d", "t", "", precise);
        assert_eq!(record.saved_at.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(record.saved_at.timestamp_subsec_nanos(), 123_000_000);

        let raw = serde_json::to_string(&record).unwrap();
        let back: PromptRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        let record = PromptRecord::new("d", "héllo", "", Utc::now());
        assert_eq!(record.char_count(), 5);
    }
}
