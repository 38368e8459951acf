//! Minimal HTML pages for the browser flow.

use axum::response::Html;

use crate::auth::Identity;

const LOG_IN_FORM: &str = r#"<form action="/log-in" method="POST">
      <label for="username">Username</label>
      <input id="username" name="username" placeholder="username" type="text" />
      <label for="password">Password</label>
      <input id="password" name="password" type="password" />
      <button>Log In</button>
    </form>"#;

const SIGN_UP_FORM: &str = r#"<form action="/sign-up" method="POST">
      <label for="username">Username</label>
      <input id="username" name="username" placeholder="username" type="text" />
      <label for="password">Password</label>
      <input id="password" name="password" type="password" />
      <button>Sign Up</button>
    </form>"#;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\" />\n    <title>{title}</title>\n  </head>\n  <body>\n    {body}\n  </body>\n</html>\n"
    ))
}

fn notice(message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"error\">{}</p>\n    ", escape(m)))
        .unwrap_or_default()
}

/// Home page: greeting for a logged-in user, log-in form otherwise.
pub fn index(identity: &Identity, message: Option<&str>) -> Html<String> {
    let body = match identity.account() {
        Some(account) => format!(
            "<h1>WELCOME BACK {}</h1>\n    <a href=\"/log-out\">LOG OUT</a>",
            escape(&account.username)
        ),
        None => format!(
            "<h1>please log in</h1>\n    {}{LOG_IN_FORM}\n    <p><a href=\"/sign-up\">Sign up</a></p>",
            notice(message)
        ),
    };
    layout("Authentication", &body)
}

pub fn sign_up(message: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Sign Up</h1>\n    {}{SIGN_UP_FORM}\n    <p><a href=\"/\">Log in</a></p>",
        notice(message)
    );
    layout("Sign Up", &body)
}

pub fn error_page(message: &str) -> Html<String> {
    let body = format!(
        "<h1>Error</h1>\n    <p>{}</p>\n    <a href=\"/\">Home</a>",
        escape(message)
    );
    layout("Error", &body)
}

/// Escape text for HTML element and attribute content.
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Account;
    use uuid::Uuid;

    #[test]
    fn escape_replaces_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape("alice"), "alice");
    }

    #[test]
    fn index_greets_authenticated_user_escaped() {
        let identity = Identity::Authenticated(Account {
            id: Uuid::nil(),
            username: "<b>alice</b>".to_string(),
            password_hash: "$argon2id$secret-hash".to_string(),
        });
        let Html(page) = index(&identity, None);
        assert!(page.contains("WELCOME BACK &lt;b&gt;alice&lt;/b&gt;"));
        assert!(page.contains("/log-out"));
        assert!(!page.contains("argon2id"));
    }

    #[test]
    fn index_shows_log_in_form_for_anonymous() {
        let Html(page) = index(&Identity::Anonymous, Some("invalid username or password"));
        assert!(page.contains("action=\"/log-in\""));
        assert!(page.contains("invalid username or password"));
        assert!(page.contains("href=\"/sign-up\""));
    }

    #[test]
    fn sign_up_page_posts_to_sign_up() {
        let Html(page) = sign_up(None);
        assert!(page.contains("action=\"/sign-up\""));
        assert!(!page.contains("class=\"error\""));
    }
}
