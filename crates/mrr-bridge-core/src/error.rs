use thiserror::Error;

#[derive(Debug, Error)]
pub enum MrrError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient periods: found {found} monthly columns, need {required} (opening + closing quarters)")]
    InsufficientPeriods { found: usize, required: usize },

    #[error("No customer identifier column found in the table")]
    NoCustomerColumn,

    #[error("Empty table: {0}")]
    EmptyTable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MrrError {
    fn from(e: serde_json::Error) -> Self {
        MrrError::SerializationError(e.to_string())
    }
}
