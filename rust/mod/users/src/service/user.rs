use doorman_core::{new_id, now_rfc3339};
use doorman_sql::Value;

use crate::model::{UpdateUser, User};
use crate::service::password::{hash_password, verify_password};
use crate::service::{UserService, UsersError};

impl UserService {
    /// Create a new user from a username and plaintext password.
    ///
    /// The password is hashed before anything is persisted. A taken
    /// username yields [`UsersError::DuplicateUsername`] — either from the
    /// friendly pre-check or from the UNIQUE constraint when two
    /// registrations race.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, UsersError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UsersError::Validation("username is required".into()));
        }
        if password.is_empty() {
            return Err(UsersError::Validation("password is required".into()));
        }

        if self.find_by_username(username)?.is_some() {
            return Err(UsersError::DuplicateUsername(username.to_string()));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("username", Value::Text(user.username.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, UsersError> {
        self.get_record("users", id)
    }

    /// Find a user by username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, UsersError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| UsersError::Storage(e.to_string()))?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let data = row
                    .get_str("data")
                    .ok_or_else(|| UsersError::Internal("missing data column".into()))?;
                let user: User = serde_json::from_str(data)
                    .map_err(|e| UsersError::Internal(e.to_string()))?;
                Ok(Some(user))
            }
        }
    }

    /// List all users, newest first.
    pub fn list_users(&self) -> Result<Vec<User>, UsersError> {
        self.list_records("users")
    }

    /// Apply an allow-listed profile update.
    ///
    /// The uniqueness check excludes the record itself, so keeping one's
    /// own username is not a conflict. An absent or empty password leaves
    /// the stored hash untouched; a non-empty one is rehashed with a fresh
    /// salt.
    pub fn update_user(&self, id: &str, input: UpdateUser) -> Result<User, UsersError> {
        let mut user: User = self.get_record("users", id)?;

        let username = input.username.trim();
        if username.is_empty() {
            return Err(UsersError::Validation("username is required".into()));
        }

        if let Some(existing) = self.find_by_username(username)? {
            if existing.id != id {
                return Err(UsersError::DuplicateUsername(username.to_string()));
            }
        }

        user.username = username.to_string();
        if let Some(password) = input.password.as_deref() {
            if !password.is_empty() {
                user.password_hash = hash_password(password)?;
            }
        }
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            id,
            &user,
            &[
                ("username", Value::Text(user.username.clone())),
                ("updated_at", Value::Text(user.updated_at.clone())),
            ],
        )?;
        Ok(user)
    }

    /// Delete a user by id, purging any sessions still logged in as them.
    pub fn delete_user(&self, id: &str) -> Result<(), UsersError> {
        self.sql
            .exec(
                "DELETE FROM sessions WHERE user_id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| UsersError::Storage(e.to_string()))?;

        self.delete_record("users", id)?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Check a candidate plaintext against a user's stored hash.
    pub fn verify_password(&self, user: &User, candidate: &str) -> bool {
        verify_password(candidate, &user.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::UsersConfig;
    use doorman_sql::SqliteStore;
    use std::sync::Arc;

    fn test_service() -> Arc<UserService> {
        let sql: Arc<dyn doorman_sql::SqlStore> =
            Arc::new(SqliteStore::open_in_memory().unwrap());
        UserService::new(sql, UsersConfig::default()).unwrap()
    }

    #[test]
    fn test_user_crud() {
        let svc = test_service();

        // Create
        let user = svc.create_user("alice", "pw1").unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw1");

        // Get
        let fetched = svc.get_user(&user.id).unwrap();
        assert_eq!(fetched.username, "alice");
        assert!(svc.verify_password(&fetched, "pw1"));

        // Update
        let updated = svc
            .update_user(
                &user.id,
                UpdateUser { username: "alice2".into(), password: None },
            )
            .unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.id, user.id);

        // List
        let all = svc.list_users().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].username, "alice2");

        // Delete
        svc.delete_user(&user.id).unwrap();
        assert!(svc.get_user(&user.id).is_err());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let svc = test_service();
        svc.create_user("alice", "pw1").unwrap();

        let err = svc.create_user("alice", "pw2").unwrap_err();
        assert!(matches!(err, UsersError::DuplicateUsername(_)));
        assert_eq!(svc.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_update_uniqueness_excludes_self() {
        let svc = test_service();
        let alice = svc.create_user("alice", "pw").unwrap();
        svc.create_user("bob", "pw").unwrap();

        // Keeping one's own username is fine.
        svc.update_user(
            &alice.id,
            UpdateUser { username: "alice".into(), password: None },
        )
        .unwrap();

        // Taking someone else's is not.
        let err = svc
            .update_user(
                &alice.id,
                UpdateUser { username: "bob".into(), password: None },
            )
            .unwrap_err();
        assert!(matches!(err, UsersError::DuplicateUsername(_)));
    }

    #[test]
    fn test_update_empty_password_keeps_hash() {
        let svc = test_service();
        let user = svc.create_user("alice", "original").unwrap();

        let updated = svc
            .update_user(
                &user.id,
                UpdateUser { username: "alice".into(), password: Some(String::new()) },
            )
            .unwrap();
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(svc.verify_password(&updated, "original"));
    }

    #[test]
    fn test_update_password_rehashes() {
        let svc = test_service();
        let user = svc.create_user("alice", "old").unwrap();

        let updated = svc
            .update_user(
                &user.id,
                UpdateUser { username: "alice".into(), password: Some("new".into()) },
            )
            .unwrap();
        assert_ne!(updated.password_hash, user.password_hash);
        assert!(svc.verify_password(&updated, "new"));
        assert!(!svc.verify_password(&updated, "old"));
    }

    #[test]
    fn test_find_by_username() {
        let svc = test_service();
        let user = svc.create_user("alice", "pw").unwrap();

        let found = svc.find_by_username("alice").unwrap();
        assert_eq!(found.unwrap().id, user.id);
        assert!(svc.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_blank_username_rejected() {
        let svc = test_service();
        let err = svc.create_user("   ", "pw").unwrap_err();
        assert!(matches!(err, UsersError::Validation(_)));
    }
}
