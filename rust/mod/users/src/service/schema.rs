use doorman_sql::SqlStore;

use crate::service::UsersError;

/// Initialize the SQLite schema.
///
/// `users.username` carries a true UNIQUE constraint: the friendly
/// duplicate check in the service is a pre-check for messaging, and the
/// constraint closes the check-then-write race between concurrent
/// registrations.
pub fn init_schema(sql: &dyn SqlStore) -> Result<(), UsersError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        // Cookie sessions. user_id is nullable: an anonymous session still
        // carries flash messages.
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| UsersError::Storage(e.to_string()))?;
    }

    Ok(())
}
