use serde::Deserialize;

/// POST /users/new body.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirmation: String,
}

/// POST /users/login body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// PUT /users/{id}/edit body (delivered as a POST with `_method=put`).
///
/// An empty password field means "keep the current password".
#[derive(Debug, Clone, Deserialize)]
pub struct EditForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}
