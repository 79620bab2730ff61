//! Session-cookie middleware and form method override.
//!
//! Every request (except the sessionless system endpoints) is bound to a
//! server-side session row. The cookie value is `"<id>.<sig>"` where the
//! signature is HMAC-SHA256 over the id with the configured secret, so a
//! forged or truncated cookie falls back to a fresh session instead of
//! probing the store with attacker-chosen ids.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use doorman_core::ServiceError;

use crate::service::UserService;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "doorman_sid";

/// Largest form body the method-override layer will buffer.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// State for the session middleware.
#[derive(Clone)]
pub struct SessionState {
    svc: Arc<UserService>,
    secret: Arc<str>,
}

impl SessionState {
    pub fn new(svc: Arc<UserService>, secret: &str) -> Self {
        Self {
            svc,
            secret: Arc::from(secret),
        }
    }
}

/// The session bound to the current request, stored in request extensions
/// for handlers to extract via `Extension<CurrentSession>`.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// Session row id.
    pub id: String,
    /// Logged-in user id, if any. A weak reference — the user may no
    /// longer exist.
    pub user_id: Option<String>,
}

/// Resolve (or create) the request's session and expose it to handlers.
///
/// A missing cookie, bad signature, unknown id, or expired row all mean the
/// same thing: start a fresh anonymous session and set the cookie on the
/// way out.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_sessionless_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let existing = cookie_value(request.headers(), SESSION_COOKIE)
        .and_then(|raw| verify_cookie(&state.secret, raw));

    let session = match existing {
        Some(id) => state.svc.get_session(&id).map_err(ServiceError::from)?,
        None => None,
    };

    let (session, fresh) = match session {
        Some(s) => (s, false),
        None => {
            let s = state.svc.create_session().map_err(ServiceError::from)?;
            tracing::debug!(session_id = %s.id, "created fresh session");
            (s, true)
        }
    };

    request.extensions_mut().insert(CurrentSession {
        id: session.id.clone(),
        user_id: session.user_id.clone(),
    });

    let mut response = next.run(request).await;

    if fresh {
        let cookie = format!(
            "{}={}.{}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            session.id,
            sign(&state.secret, &session.id),
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| ServiceError::Internal(format!("bad cookie value: {}", e)))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Rewrite a form POST carrying `_method=put|delete` to that method before
/// routing (HTML forms can only submit GET and POST).
pub async fn method_override(request: Request, next: Next) -> Result<Response, ServiceError> {
    let is_form_post = request.method() == Method::POST
        && request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if !is_form_post {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| ServiceError::Validation(format!("unreadable form body: {}", e)))?;

    if let Some(method) = override_method(&bytes) {
        parts.method = method;
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Extract the overriding method from an urlencoded body, if present.
fn override_method(body: &[u8]) -> Option<Method> {
    let body = std::str::from_utf8(body).ok()?;
    for pair in body.split('&') {
        if let Some(value) = pair.strip_prefix("_method=") {
            return match value.to_ascii_lowercase().as_str() {
                "put" => Some(Method::PUT),
                "delete" => Some(Method::DELETE),
                _ => None,
            };
        }
    }
    None
}

/// Extract a cookie's raw value from the Cookie header.
fn cookie_value<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}

/// HMAC-SHA256 signature over the session id, hex-encoded.
fn sign(secret: &str, id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a `"<id>.<sig>"` cookie value, returning the id when the
/// signature matches. Comparison is constant-time via `verify_slice`.
fn verify_cookie(secret: &str, raw: &str) -> Option<String> {
    let (id, sig_hex) = raw.split_once('.')?;
    let sig = hex::decode(sig_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    mac.verify_slice(&sig).ok()?;
    Some(id.to_string())
}

/// System endpoints that don't need a session.
fn is_sessionless_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_sign_verify_roundtrip() {
        let id = "abc123";
        let raw = format!("{}.{}", id, sign("secret", id));
        assert_eq!(verify_cookie("secret", &raw).as_deref(), Some(id));
    }

    #[test]
    fn test_bad_signature_rejected() {
        let raw = format!("abc123.{}", sign("other-secret", "abc123"));
        assert!(verify_cookie("secret", &raw).is_none());
        assert!(verify_cookie("secret", "abc123").is_none());
        assert!(verify_cookie("secret", "abc123.nothex").is_none());
    }

    #[test]
    fn test_tampered_id_rejected() {
        let raw = format!("evil.{}", sign("secret", "abc123"));
        assert!(verify_cookie("secret", &raw).is_none());
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; doorman_sid=abc.def; x=y"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_override_method_parsing() {
        assert_eq!(override_method(b"a=1&_method=put&b=2"), Some(Method::PUT));
        assert_eq!(override_method(b"_method=DELETE"), Some(Method::DELETE));
        assert_eq!(override_method(b"_method=patch"), None);
        assert_eq!(override_method(b"a=1&b=2"), None);
    }
}
