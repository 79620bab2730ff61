//! HTTP handlers for registration, login, and the user CRUD pages.
//!
//! Expected failures (bad credentials, taken username, denied access)
//! never surface as 4xx — they become a flash alert plus a redirect, the
//! same shape the browser gets on success.

use axum::Extension;
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::guards::{self, Denial, referer_or_home};
use crate::api::middleware::CurrentSession;
use crate::api::{AppState, views};
use crate::model::{EditForm, FlashKind, LoginForm, SignupForm, UpdateUser};
use crate::service::UsersError;

/// GET /users — the directory, visible to logged-in visitors only.
pub async fn list_users(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, Denial> {
    guards::require_login(&svc, &session)?;

    let flash = svc.take_flash(&session.id)?;
    let users = svc.list_users()?;
    Ok(views::users_index_page(&flash, &users).into_response())
}

/// GET /users/{id} — a user's profile page.
pub async fn show_user(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Response, Denial> {
    let viewer_id = guards::require_login(&svc, &session)?;

    let user = svc.get_user(&id)?;
    let flash = svc.take_flash(&session.id)?;
    let is_owner = viewer_id == user.id;
    Ok(views::user_show_page(&flash, &user, is_owner).into_response())
}

/// GET /users/new — the signup form.
pub async fn signup_form(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, Denial> {
    let flash = svc.take_flash(&session.id)?;
    Ok(views::signup_page(&flash).into_response())
}

/// POST /users/new — create an account.
///
/// The username check runs before the confirmation check, so a visitor
/// with both problems hears about the username first.
pub async fn register(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<SignupForm>,
) -> Result<Response, Denial> {
    // Blank fields bypass the form's client-side `required` easily, so
    // they get the same alert-and-redirect treatment as every other
    // expected failure.
    if form.username.trim().is_empty() || form.password.is_empty() {
        svc.set_flash(
            &session.id,
            FlashKind::Alert,
            "Username and password are required",
        )?;
        return Ok(Redirect::to("/users/new").into_response());
    }

    if svc.find_by_username(form.username.trim())?.is_some() {
        svc.set_flash(&session.id, FlashKind::Alert, "Username not available")?;
        return Ok(Redirect::to("/users/new").into_response());
    }

    if form.password != form.confirmation {
        svc.set_flash(&session.id, FlashKind::Alert, "Passwords must match")?;
        return Ok(Redirect::to("/users/new").into_response());
    }

    match svc.create_user(&form.username, &form.password) {
        Ok(_) => {}
        // Two registrations raced past the pre-check; the constraint
        // caught the loser.
        Err(UsersError::DuplicateUsername(_)) => {
            svc.set_flash(&session.id, FlashKind::Alert, "Username not available")?;
            return Ok(Redirect::to("/users/new").into_response());
        }
        Err(e) => return Err(e.into()),
    }

    svc.set_flash(&session.id, FlashKind::Notice, "Successfully created user")?;
    Ok(Redirect::to("/").into_response())
}

/// GET /users/login — the login form.
pub async fn login_form(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, Denial> {
    let flash = svc.take_flash(&session.id)?;
    Ok(views::login_page(&flash).into_response())
}

/// POST /users/login — authenticate.
///
/// An unknown username and a wrong password produce the same alert, so
/// the login page never confirms which usernames exist.
pub async fn login(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<LoginForm>,
) -> Result<Response, Denial> {
    let user = svc.find_by_username(form.username.trim())?;
    let authenticated = match user {
        Some(ref user) => svc.verify_password(user, &form.password),
        None => false,
    };

    if !authenticated {
        svc.set_flash(&session.id, FlashKind::Alert, "Incorrect username/password")?;
        return Ok(Redirect::to("/users/login").into_response());
    }

    // authenticated implies Some(user)
    if let Some(user) = user {
        svc.set_session_user(&session.id, Some(&user.id))?;
        tracing::info!(user_id = %user.id, "login");
    }
    svc.set_flash(&session.id, FlashKind::Notice, "Successfully logged in")?;
    Ok(Redirect::to("/").into_response())
}

/// GET /users/logout — end the session. Logging out while logged out is
/// harmless.
pub async fn logout(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, Denial> {
    svc.destroy_session(&session.id)?;
    Ok(Redirect::to("/").into_response())
}

/// GET /users/{id}/edit — the profile edit form, owner only.
pub async fn edit_form(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, Denial> {
    guards::require_owner(&svc, &session, &headers, &id)?;

    let user = svc.get_user(&id)?;
    let flash = svc.take_flash(&session.id)?;
    Ok(views::edit_page(&flash, &user).into_response())
}

/// PUT /users/{id}/edit — apply a profile update, owner only.
///
/// An empty password field means "keep the current password"; a filled
/// one must match its confirmation.
pub async fn update_user(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<EditForm>,
) -> Result<Response, Denial> {
    guards::require_owner(&svc, &session, &headers, &id)?;

    if form.username.trim().is_empty() {
        svc.set_flash(&session.id, FlashKind::Alert, "Username is required")?;
        return Ok(Redirect::to(&format!("/users/{id}/edit")).into_response());
    }

    if let Some(existing) = svc.find_by_username(form.username.trim())? {
        if existing.id != id {
            svc.set_flash(&session.id, FlashKind::Alert, "Username not available")?;
            return Ok(Redirect::to(referer_or_home(&headers)).into_response());
        }
    }

    if form.password != form.confirmation {
        svc.set_flash(&session.id, FlashKind::Alert, "Passwords must match")?;
        return Ok(Redirect::to(&format!("/users/{id}/edit")).into_response());
    }

    let update = UpdateUser {
        username: form.username,
        password: Some(form.password),
    };
    match svc.update_user(&id, update) {
        Ok(_) => {}
        Err(UsersError::DuplicateUsername(_)) => {
            svc.set_flash(&session.id, FlashKind::Alert, "Username not available")?;
            return Ok(Redirect::to(referer_or_home(&headers)).into_response());
        }
        Err(e) => return Err(e.into()),
    }

    svc.set_flash(&session.id, FlashKind::Notice, "Successfully updated user")?;
    Ok(Redirect::to(&format!("/users/{id}")).into_response())
}

/// DELETE /users/{id} — remove the account, owner only.
///
/// The session's identity is cleared before the user row goes away;
/// deleting the user purges every session logged in as them, and this
/// session must survive to carry the confirmation flash.
pub async fn delete_user(
    State(svc): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, Denial> {
    guards::require_owner(&svc, &session, &headers, &id)?;

    svc.set_session_user(&session.id, None)?;
    svc.delete_user(&id)?;
    svc.set_flash(&session.id, FlashKind::Notice, "Successfully deleted user")?;
    Ok(Redirect::to("/").into_response())
}
