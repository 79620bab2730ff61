use crate::error::SqlError;

/// A dynamically-typed SQL parameter or column value.
///
/// Doorman stores records as JSON text with a few indexed side columns, so
/// only the types those columns need are represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

/// A row returned from a SQL query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// SqlStore provides a SQL execution interface backed by an embedded
/// database. Every read is a fresh lookup; there is no caching layer.
pub trait SqlStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return the affected
    /// row count. Writes rejected by a UNIQUE constraint come back as
    /// [`SqlError::UniqueViolation`].
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError>;
}
