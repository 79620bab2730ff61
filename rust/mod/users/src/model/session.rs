use serde::{Deserialize, Serialize};

/// A server-side session, referenced by the opaque id carried in the
/// session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id (UUIDv4, no dashes).
    pub id: String,

    /// Logged-in user id. A weak reference: the user may have been deleted
    /// since login, in which case the session counts as anonymous when the
    /// current user is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Pending one-shot notice, shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,

    /// Pending one-shot alert, shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 expiry; a session past this point is treated as absent.
    pub expires_at: String,
}

impl Session {
    /// Whether the session carries a login identity.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Flash message kind. At most one pending message per kind; a second set
/// before consumption overwrites the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Notice,
    Alert,
}

/// Pending flash messages taken from a session for one render.
#[derive(Debug, Clone, Default)]
pub struct Flash {
    pub notice: Option<String>,
    pub alert: Option<String>,
}
