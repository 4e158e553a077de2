use crate::validation::FormErrors;

/// Errors raised while decoding or converting patient records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("health check rating must be between 0 and 3, received {0}")]
    InvalidRating(u8),
    #[error("unknown entry type: {0}")]
    UnknownEntryType(String),
    #[error("entry form is invalid: {0}")]
    InvalidForm(FormErrors),
    #[error("unknown patient: {0}")]
    UnknownPatient(String),
    #[error("could not decode record: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::Decode(err.to_string())
    }
}
