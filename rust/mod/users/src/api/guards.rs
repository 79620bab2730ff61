//! Authorization guards.
//!
//! Both guards record a flash alert and answer with a redirect instead of
//! a 401/403 — denial is a normal page flow in this application, not an
//! error status.

use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};

use doorman_core::ServiceError;

use crate::api::middleware::CurrentSession;
use crate::model::FlashKind;
use crate::service::{UserService, UsersError};

/// Why a handler stopped early: either a guard redirected the visitor, or
/// something actually failed. Both convert straight into a response, so
/// handlers can use `?` throughout.
pub enum Denial {
    Redirect(Response),
    Failed(ServiceError),
}

impl From<UsersError> for Denial {
    fn from(e: UsersError) -> Self {
        Denial::Failed(ServiceError::from(e))
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        match self {
            Denial::Redirect(resp) => resp,
            Denial::Failed(err) => err.into_response(),
        }
    }
}

/// Require a logged-in session; the gate trusts the session-held id and
/// does not re-check that the user row still exists.
///
/// On denial: alert flash + redirect to the login page.
pub fn require_login(svc: &UserService, session: &CurrentSession) -> Result<String, Denial> {
    match &session.user_id {
        Some(user_id) => Ok(user_id.clone()),
        None => {
            svc.set_flash(&session.id, FlashKind::Alert, "You need to log in to continue")?;
            Err(Denial::Redirect(Redirect::to("/users/login").into_response()))
        }
    }
}

/// Require that the session identity owns the target resource.
///
/// On denial: alert flash + redirect to the referring page, or home when
/// there is no usable Referer.
pub fn require_owner(
    svc: &UserService,
    session: &CurrentSession,
    headers: &HeaderMap,
    resource_id: &str,
) -> Result<String, Denial> {
    match &session.user_id {
        Some(user_id) if user_id == resource_id => Ok(user_id.clone()),
        _ => {
            svc.set_flash(
                &session.id,
                FlashKind::Alert,
                "You are unauthorized to make that request",
            )?;
            Err(Denial::Redirect(
                Redirect::to(referer_or_home(headers)).into_response(),
            ))
        }
    }
}

/// The Referer path, or `/` when absent or not a local path.
pub fn referer_or_home(headers: &HeaderMap) -> &str {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|r| r.starts_with('/'))
        .unwrap_or("/")
}
