mod inbox_row;
mod message_record;

pub use inbox_row::InboxRow;
pub use message_record::{derived_key, format_local_date, MessageRecord, SENDER_PREFIX_LEN};
