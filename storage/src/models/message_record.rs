//! Message record model: the document written to the backup collection.
//!
//! Documents are keyed by [`derived_key`], which inverts the timestamp so that stores ordering
//! ids ascending list the newest messages first.

use chrono::{LocalResult, TimeZone};
use serde::{Deserialize, Serialize};

/// Number of sender characters appended to the key.
pub const SENDER_PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub sender: String,
    pub message: String,
    /// Milliseconds since epoch, as reported by the source.
    pub timestamp: i64,
    /// `yyyy-MM-dd HH:mm:ss` in the local timezone, derived from `timestamp`.
    pub date: String,
}

impl MessageRecord {
    /// Creates a record, formatting `date` from `timestamp` now.
    pub fn new(sender: &str, message: &str, timestamp: i64) -> Self {
        Self {
            sender: sender.to_string(),
            message: message.to_string(),
            timestamp,
            date: format_local_date(timestamp),
        }
    }

    /// Document id under which this record is stored.
    pub fn key(&self) -> String {
        derived_key(self.timestamp, &self.sender)
    }
}

/// `(i64::MAX - timestamp) + "_" + first five characters of sender`.
///
/// The subtraction wraps, so negative timestamps still produce a key.
pub fn derived_key(timestamp: i64, sender: &str) -> String {
    let prefix: String = sender.chars().take(SENDER_PREFIX_LEN).collect();
    format!("{}_{}", i64::MAX.wrapping_sub(timestamp), prefix)
}

/// Formats epoch milliseconds in the local timezone; empty when not representable.
pub fn format_local_date(timestamp: i64) -> String {
    match chrono::Local.timestamp_millis_opt(timestamp) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        LocalResult::None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_key_example() {
        assert_eq!(
            derived_key(1_700_000_000_000, "12345"),
            "9223370336854775807_12345"
        );
    }

    #[test]
    fn test_derived_key_truncates_sender() {
        assert_eq!(derived_key(0, "+905551234567"), "9223372036854775807_+9055");
        assert_eq!(derived_key(0, "BANK"), "9223372036854775807_BANK");
        assert_eq!(derived_key(0, ""), "9223372036854775807_");
    }

    #[test]
    fn test_derived_key_counts_characters_not_bytes() {
        assert_eq!(derived_key(1, "Ünïcødé"), "9223372036854775806_Ünïcø");
    }

    #[test]
    fn test_derived_key_collides_on_prefix() {
        let a = MessageRecord::new("1234567", "first", 42);
        let b = MessageRecord::new("1234599", "second", 42);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_newer_messages_sort_first() {
        let older = derived_key(1_600_000_000_000, "a");
        let newer = derived_key(1_700_000_000_000, "a");
        assert!(newer < older);
    }

    #[test]
    fn test_derived_key_wraps_for_negative_timestamp() {
        assert_eq!(derived_key(-1, "x"), format!("{}_x", i64::MIN));
    }

    #[test]
    fn test_record_date_is_formatted() {
        let record = MessageRecord::new("12345", "hello", 1_700_000_000_000);
        assert_eq!(record.date.len(), "2023-11-14 22:13:20".len());
        assert!(record.date.starts_with("2023-11-1"));
    }
}
