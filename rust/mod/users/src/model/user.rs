use serde::{Deserialize, Serialize};

/// A user account.
///
/// The password hash is persisted inside the record's JSON data column and
/// is never interpolated into a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name. Unique across all users, enforced by the storage layer.
    pub username: String,

    /// Salted argon2id hash in PHC string format. Never the plaintext.
    pub password_hash: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Allow-listed fields for a profile update.
///
/// Anything not named here (`id`, `password_hash`, timestamps) cannot be
/// touched by a request body.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    /// New username (may equal the current one).
    pub username: String,

    /// New plaintext password. `None` means "do not change the password";
    /// an empty string is treated the same way.
    pub password: Option<String>,
}
