use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmsBackupError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Notification error: {0}")]
    Notify(String),
}

/// Failures while pulling SMS fragments out of an intent payload.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Intent action {0} does not carry SMS")]
    WrongAction(String),

    #[error("Malformed pdus: {0}")]
    MalformedPdus(String),
}

pub type Result<T> = std::result::Result<T, SmsBackupError>;
