//! Route registration — module routes, system endpoints, and the session
//! layers that wrap everything.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Extension;

use doorman_core::ServiceError;
use doorman_users::api::views;
use doorman_users::api::{CurrentSession, SessionState, session_middleware};
use doorman_users::service::UserService;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

/// Build the complete router with all routes.
///
/// Module routes mount under `/{module_name}` and are already
/// `Router<()>` (they called `.with_state()` internally). The session
/// middleware wraps everything except the system endpoints.
///
/// The method-override middleware is NOT applied here: router layers run
/// after route matching, so a rewritten method would arrive too late to
/// change which route fires. The caller wraps the finished router with
/// `doorman_users::api::method_override` as an outer service before
/// serving.
pub fn build_router(
    state: AppState,
    session_state: SessionState,
    module_routes: Vec<(&str, Router)>,
) -> Router {
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router<()> = Router::new()
        .route("/", get(home_page))
        .with_state(state)
        .merge(system_routes);

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app.fallback(not_found)
        .layer(middleware::from_fn_with_state(
            session_state,
            session_middleware,
        ))
}

/// The landing page: pending flash messages plus a greeting for the
/// logged-in user, if any.
async fn home_page(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, ServiceError> {
    let flash = state
        .users
        .take_flash(&session.id)
        .map_err(ServiceError::from)?;

    // A dangling user id (account deleted since login) renders as
    // anonymous.
    let current = state
        .users
        .current_user(session.user_id.as_deref())
        .map_err(ServiceError::from)?;

    Ok(views::home_page(&flash, current.as_ref()).into_response())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "doormand",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Unknown paths get the standard HTML error page, not a bare 404.
async fn not_found() -> Response {
    ServiceError::NotFound("Page Not Found".to_string()).into_response()
}
