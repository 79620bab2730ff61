pub mod guards;
pub mod middleware;
mod users;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::service::UserService;

pub use middleware::{CurrentSession, SessionState, method_override, session_middleware};

/// Shared handler state.
pub type AppState = Arc<UserService>;

/// Build the users router.
///
/// All routes are relative — the caller nests them under `/users`. The
/// session middleware is applied at the application level (it must also
/// cover the home page), not here.
pub fn build_router(svc: Arc<UserService>) -> Router {
    Router::new()
        .route("/", get(users::list_users))
        .route("/login", get(users::login_form).post(users::login))
        .route("/logout", get(users::logout))
        .route("/new", get(users::signup_form).post(users::register))
        .route("/{id}", get(users::show_user).delete(users::delete_user))
        .route("/{id}/edit", get(users::edit_form).put(users::update_user))
        .with_state(svc)
}
