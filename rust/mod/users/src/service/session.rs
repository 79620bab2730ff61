use doorman_core::new_id;
use doorman_sql::Value;

use crate::model::{Flash, FlashKind, Session, User};
use crate::service::{UserService, UsersError};

impl UserService {
    /// Create a fresh anonymous session.
    pub fn create_session(&self) -> Result<Session, UsersError> {
        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::seconds(self.config.session_ttl_secs);

        let session = Session {
            id: new_id(),
            user_id: None,
            notice: None,
            alert: None,
            created_at: now.to_rfc3339(),
            expires_at: expires.to_rfc3339(),
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Null),
                ("created_at", Value::Text(session.created_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;
        Ok(session)
    }

    /// Look up a session by id. An unknown or expired id is `None`, never
    /// an error — the caller creates a fresh session in that case. Expired
    /// rows are dropped on sight.
    pub fn get_session(&self, id: &str) -> Result<Option<Session>, UsersError> {
        let session: Session = match self.get_record("sessions", id) {
            Ok(s) => s,
            Err(UsersError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if is_expired(&session.expires_at) {
            // Best-effort cleanup; the row is dead either way.
            let _ = self.delete_record("sessions", id);
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Set or clear the session's login identity.
    pub fn set_session_user(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<(), UsersError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.user_id = user_id.map(|s| s.to_string());

        let user_col = match user_id {
            Some(id) => Value::Text(id.to_string()),
            None => Value::Null,
        };
        self.update_record("sessions", session_id, &session, &[("user_id", user_col)])
    }

    /// Destroy a session entirely (logout). Destroying a session that is
    /// already gone is a no-op.
    pub fn destroy_session(&self, session_id: &str) -> Result<(), UsersError> {
        match self.delete_record("sessions", session_id) {
            Ok(()) | Err(UsersError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Write a one-shot flash message. At most one pending message per
    /// kind; setting again before consumption overwrites.
    pub fn set_flash(
        &self,
        session_id: &str,
        kind: FlashKind,
        message: &str,
    ) -> Result<(), UsersError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        match kind {
            FlashKind::Notice => session.notice = Some(message.to_string()),
            FlashKind::Alert => session.alert = Some(message.to_string()),
        }
        self.update_record("sessions", session_id, &session, &[])
    }

    /// Read and clear both flash slots in one storage round-trip, so each
    /// message renders at most once.
    pub fn take_flash(&self, session_id: &str) -> Result<Flash, UsersError> {
        let mut session: Session = match self.get_record("sessions", session_id) {
            Ok(s) => s,
            Err(UsersError::NotFound(_)) => return Ok(Flash::default()),
            Err(e) => return Err(e),
        };

        let flash = Flash {
            notice: session.notice.take(),
            alert: session.alert.take(),
        };

        if flash.notice.is_some() || flash.alert.is_some() {
            self.update_record("sessions", session_id, &session, &[])?;
        }
        Ok(flash)
    }

    /// Resolve a session-held user id, treating a dangling id (the record
    /// was deleted since login) as anonymous.
    pub fn current_user(&self, user_id: Option<&str>) -> Result<Option<User>, UsersError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        match self.get_user(user_id) {
            Ok(user) => Ok(Some(user)),
            Err(UsersError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_expired(expires_at: &str) -> bool {
    match chrono::DateTime::parse_from_rfc3339(expires_at) {
        Ok(t) => t <= chrono::Utc::now(),
        // Unparseable expiry means a corrupt row; treat it as dead.
        Err(_) => true,
    }
}
