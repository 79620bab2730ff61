//! Server-rendered HTML pages.
//!
//! Plain `format!`-built markup, no template engine. Every dynamic value
//! goes through [`escape_html`] before interpolation.

use axum::response::Html;

use doorman_core::escape_html;

use crate::model::{Flash, User};

/// Wrap a page body in the shared document shell with the flash banner
/// and a nav that reflects login state.
pub fn layout(title: &str, flash: &Flash, logged_in: bool, body: &str) -> Html<String> {
    let nav = if logged_in {
        r#"<a href="/users">Users</a> <a href="/users/logout">Log out</a>"#
    } else {
        r#"<a href="/users/login">Log in</a> <a href="/users/new">Sign up</a>"#
    };

    let mut banners = String::new();
    if let Some(ref notice) = flash.notice {
        banners.push_str(&format!(
            r#"<p class="flash notice">{}</p>"#,
            escape_html(notice)
        ));
    }
    if let Some(ref alert) = flash.alert {
        banners.push_str(&format!(
            r#"<p class="flash alert">{}</p>"#,
            escape_html(alert)
        ));
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <nav><a href="/">Home</a> {nav}</nav>
  {banners}
  {body}
</body>
</html>
"#,
        title = escape_html(title),
        nav = nav,
        banners = banners,
        body = body,
    ))
}

pub fn home_page(flash: &Flash, current: Option<&User>) -> Html<String> {
    let body = match current {
        Some(user) => format!(
            r#"<h1>Welcome, {}</h1>
  <p><a href="/users/{}">Your profile</a></p>"#,
            escape_html(&user.username),
            escape_html(&user.id),
        ),
        None => r#"<h1>Welcome</h1>
  <p>Log in or sign up to continue.</p>"#
            .to_string(),
    };
    layout("Home", flash, current.is_some(), &body)
}

pub fn signup_page(flash: &Flash) -> Html<String> {
    let body = r#"<h1>Sign up</h1>
  <form action="/users/new" method="post">
    <label>Username <input type="text" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <label>Confirm password <input type="password" name="confirmation" required></label>
    <button type="submit">Create account</button>
  </form>"#;
    layout("Sign up", flash, false, body)
}

pub fn login_page(flash: &Flash) -> Html<String> {
    let body = r#"<h1>Log in</h1>
  <form action="/users/login" method="post">
    <label>Username <input type="text" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">Log in</button>
  </form>"#;
    layout("Log in", flash, false, body)
}

pub fn users_index_page(flash: &Flash, users: &[User]) -> Html<String> {
    let mut items = String::new();
    for user in users {
        items.push_str(&format!(
            r#"    <li><a href="/users/{}">{}</a></li>
"#,
            escape_html(&user.id),
            escape_html(&user.username),
        ));
    }

    let body = format!(
        r#"<h1>Users</h1>
  <ul>
{items}  </ul>"#
    );
    layout("Users", flash, true, &body)
}

/// Profile page. The edit link and delete form only render for the owner.
pub fn user_show_page(flash: &Flash, user: &User, is_owner: bool) -> Html<String> {
    let controls = if is_owner {
        format!(
            r#"
  <p><a href="/users/{id}/edit">Edit</a></p>
  <form action="/users/{id}" method="post">
    <input type="hidden" name="_method" value="delete">
    <button type="submit">Delete account</button>
  </form>"#,
            id = escape_html(&user.id),
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>{username}</h1>
  <p>Joined {created_at}</p>{controls}"#,
        username = escape_html(&user.username),
        created_at = escape_html(&user.created_at),
        controls = controls,
    );
    layout(&user.username, flash, true, &body)
}

pub fn edit_page(flash: &Flash, user: &User) -> Html<String> {
    let body = format!(
        r#"<h1>Edit profile</h1>
  <form action="/users/{id}/edit" method="post">
    <input type="hidden" name="_method" value="put">
    <label>Username <input type="text" name="username" value="{username}" required></label>
    <label>New password <input type="password" name="password"></label>
    <label>Confirm new password <input type="password" name="confirmation"></label>
    <button type="submit">Save</button>
  </form>"#,
        id = escape_html(&user.id),
        username = escape_html(&user.username),
    );
    layout("Edit profile", flash, true, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            id: "u1".into(),
            username: username.into(),
            password_hash: "$argon2id$...".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_flash_banners_rendered() {
        let flash = Flash {
            notice: Some("Successfully logged in".into()),
            alert: Some("Incorrect username/password".into()),
        };
        let page = login_page(&flash).0;
        assert!(page.contains("Successfully logged in"));
        assert!(page.contains("Incorrect username/password"));
    }

    #[test]
    fn test_username_escaped() {
        let page = user_show_page(&Flash::default(), &user("<script>x</script>"), false).0;
        assert!(!page.contains("<script>x"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_owner_controls_hidden_from_others() {
        let owner_view = user_show_page(&Flash::default(), &user("alice"), true).0;
        assert!(owner_view.contains("_method"));
        assert!(owner_view.contains("/users/u1/edit"));

        let other_view = user_show_page(&Flash::default(), &user("alice"), false).0;
        assert!(!other_view.contains("_method"));
        assert!(!other_view.contains("/users/u1/edit"));
    }

    #[test]
    fn test_edit_form_prefilled() {
        let page = edit_page(&Flash::default(), &user("alice")).0;
        assert!(page.contains(r#"value="alice""#));
        assert!(page.contains(r#"value="put""#));
    }
}
