//! Extraction of SMS fragments from an SMS-received intent.

use serde_json::Value;
use tracing::warn;

use crate::error::ExtractError;
use crate::types::{Intent, SmsFragment, SMS_RECEIVED_ACTION};

/// Extras key holding the fragment array.
pub const PDUS_EXTRA: &str = "pdus";

/// Returns the fragments of `intent` in delivery order.
///
/// An intent without `pdus` yields an empty list. Fragments that cannot be decoded are logged
/// and skipped; the rest of the event is still returned.
pub fn messages_from_intent(intent: &Intent) -> Result<Vec<SmsFragment>, ExtractError> {
    if intent.action != SMS_RECEIVED_ACTION {
        return Err(ExtractError::WrongAction(intent.action.clone()));
    }

    let pdus = match intent.extras.get(PDUS_EXTRA) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ExtractError::MalformedPdus(format!(
                "expected array, got {}",
                other
            )))
        }
    };

    let fragments = pdus
        .iter()
        .enumerate()
        .filter_map(|(index, pdu)| {
            match serde_json::from_value::<SmsFragment>(pdu.clone()) {
                Ok(fragment) => Some(fragment),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed SMS fragment");
                    None
                }
            }
        })
        .collect();
    Ok(fragments)
}
