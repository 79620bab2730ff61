use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::SqlError;
use crate::traits::{Row, SqlStore, Value};

/// SqliteStore is a SqlStore implementation backed by rusqlite (bundled
/// SQLite). A single connection behind a mutex serializes writes; WAL mode
/// keeps reads cheap.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SqlError> {
        let conn = Connection::open(path)
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SqlError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SqlError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Text(s) => Box::new(s.as_str()),
            }
        })
        .collect()
}

/// Map a rusqlite write error, surfacing UNIQUE violations as their own
/// variant so callers can report duplicates.
fn map_exec_error(e: rusqlite::Error) -> SqlError {
    if let rusqlite::Error::SqliteFailure(ffi, ref msg) = e {
        if ffi.code == rusqlite::ErrorCode::ConstraintViolation
            && msg.as_deref().is_some_and(|m| m.contains("UNIQUE"))
        {
            return SqlError::UniqueViolation(e.to_string());
        }
    }
    SqlError::Execution(e.to_string())
}

impl SqlStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::new();
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), row_value_at(row, i)));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SqlError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(map_exec_error)?;

        Ok(affected as u64)
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    if let Ok(i) = row.get::<_, i64>(idx) {
        return Value::Integer(i);
    }
    if let Ok(s) = row.get::<_, String>(idx) {
        return Value::Text(s);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_table() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE t (id TEXT PRIMARY KEY, name TEXT NOT NULL UNIQUE, n INTEGER)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_roundtrip() {
        let store = store_with_table();
        let affected = store
            .exec(
                "INSERT INTO t (id, name, n) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text("a".into()),
                    Value::Text("alice".into()),
                    Value::Integer(7),
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store
            .query("SELECT name, n FROM t WHERE id = ?1", &[Value::Text("a".into())])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name"), Some("alice"));
        assert_eq!(rows[0].get_i64("n"), Some(7));
    }

    #[test]
    fn test_unique_violation_is_distinct() {
        let store = store_with_table();
        let insert = "INSERT INTO t (id, name, n) VALUES (?1, ?2, ?3)";
        store
            .exec(insert, &[Value::Text("a".into()), Value::Text("alice".into()), Value::Null])
            .unwrap();

        let err = store
            .exec(insert, &[Value::Text("b".into()), Value::Text("alice".into()), Value::Null])
            .unwrap_err();
        assert!(err.is_unique_violation(), "got: {err:?}");
    }

    #[test]
    fn test_null_column() {
        let store = store_with_table();
        store
            .exec(
                "INSERT INTO t (id, name, n) VALUES (?1, ?2, ?3)",
                &[Value::Text("a".into()), Value::Text("alice".into()), Value::Null],
            )
            .unwrap();
        let rows = store.query("SELECT n FROM t", &[]).unwrap();
        assert_eq!(rows[0].get("n"), Some(&Value::Null));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("t.sqlite")).unwrap();
        store.exec("CREATE TABLE x (id TEXT)", &[]).unwrap();
    }
}
