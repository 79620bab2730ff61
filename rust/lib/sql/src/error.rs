use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    /// A UNIQUE constraint rejected the write. Callers branch on this to
    /// report duplicates instead of a generic storage failure.
    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),
}

impl SqlError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, SqlError::UniqueViolation(_))
    }
}
