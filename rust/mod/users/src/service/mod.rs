pub mod password;
pub mod schema;
pub mod session;
pub mod user;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use doorman_sql::{SqlError, SqlStore, Value};

/// Users service error type.
#[derive(Debug, Error)]
pub enum UsersError {
    /// The requested username is already taken.
    #[error("username not available: {0}")]
    DuplicateUsername(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<UsersError> for doorman_core::ServiceError {
    fn from(e: UsersError) -> Self {
        match e {
            UsersError::DuplicateUsername(m) => doorman_core::ServiceError::Conflict(m),
            UsersError::NotFound(m) => doorman_core::ServiceError::NotFound(m),
            UsersError::Validation(m) => doorman_core::ServiceError::Validation(m),
            UsersError::Storage(m) => doorman_core::ServiceError::Storage(m),
            UsersError::Internal(m) => doorman_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the users service.
#[derive(Debug, Clone)]
pub struct UsersConfig {
    /// Session lifetime in seconds (default: 7 days).
    pub session_ttl_secs: i64,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 604800, // 7 days
        }
    }
}

/// The users service. Holds the storage backend and configuration.
pub struct UserService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) config: UsersConfig,
}

impl UserService {
    /// Create a new UserService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SqlStore>, config: UsersConfig) -> Result<Arc<Self>, UsersError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }

    // ── Generic record helpers ──
    //
    // Records are stored as a JSON `data` column plus a few indexed side
    // columns, so the schema stays flat while the model structs stay free
    // to evolve.

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), UsersError> {
        let json =
            serde_json::to_string(record).map_err(|e| UsersError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            cols.push(col);
            placeholders.push(format!("?{}", i + 3));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(map_write_error)?;
        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, UsersError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| UsersError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| UsersError::NotFound(format!("{}/{}", table, id)))?;
        parse_data_column(row)
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), UsersError> {
        let json =
            serde_json::to_string(record).map_err(|e| UsersError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            sets.push(format!("{} = ?{}", col, i + 2));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        let affected = self.sql.exec(&sql, &params).map_err(map_write_error)?;
        if affected == 0 {
            return Err(UsersError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), UsersError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| UsersError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(UsersError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List all records in a table, newest first.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, UsersError> {
        let sql = format!("SELECT data FROM {} ORDER BY created_at DESC", table);
        let rows = self
            .sql
            .query(&sql, &[])
            .map_err(|e| UsersError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            items.push(parse_data_column(row)?);
        }
        Ok(items)
    }
}

fn parse_data_column<T: DeserializeOwned>(row: &doorman_sql::Row) -> Result<T, UsersError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| UsersError::Internal("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| UsersError::Internal(e.to_string()))
}

/// UNIQUE violations become duplicate-username outcomes (username is the
/// only unique column in the schema); everything else is a storage failure.
fn map_write_error(e: SqlError) -> UsersError {
    if e.is_unique_violation() {
        UsersError::DuplicateUsername(e.to_string())
    } else {
        UsersError::Storage(e.to_string())
    }
}
