//! Row of the on-device SMS table, as returned by the historical query.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InboxRow {
    pub address: Option<String>,
    pub body: Option<String>,
    /// Milliseconds since epoch.
    pub date: i64,
}

impl InboxRow {
    pub fn new(address: &str, body: &str, date: i64) -> Self {
        Self {
            address: Some(address.to_string()),
            body: Some(body.to_string()),
            date,
        }
    }
}
