//! Registration, login and logout pages.

use serde::Serialize;

use crate::forms::BoundForm;

pub const REGISTER_PATH: &str = "/auth/register/";
pub const LOGIN_PATH: &str = "/auth/login/";
pub const LOGOUT_PATH: &str = "/auth/logout/";

pub const REGISTER_TEMPLATE: &str = "auth/register.html";
pub const LOGIN_TEMPLATE: &str = "auth/login.html";

pub const MSG_FORM_ERRORS: &str = "Please correct the errors below.";
pub const MSG_INVALID_LOGIN: &str = "Invalid username or password.";
pub const MSG_LOGGED_OUT: &str = "You have been logged out.";

/// Non-field error shown on the login form when authentication fails.
pub const MSG_LOGIN_REJECTED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Context of the combined museum and staff registration page.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPageData {
    pub museum_form: BoundForm,
    pub staff_form: BoundForm,
}

/// Context of the login page.
#[derive(Debug, Clone, Serialize)]
pub struct LoginPageData {
    pub form: BoundForm,
    /// Where to go after a successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Login URL that returns to `path` afterwards.
pub fn login_url_with_next(path: &str) -> String {
    let next: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{}?next={}", LOGIN_PATH, next)
}

/// Accept a post-login redirect target only when it stays on this site.
///
/// Control characters and whitespace are refused outright: browsers strip
/// tabs and newlines from URLs, so `/\t/host` would otherwise resolve to
/// `//host`, and CR/LF cannot go into a `Location` header.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(|c| c.is_control() || c.is_whitespace())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_with_next() {
        assert_eq!(login_url_with_next("/dashboard/"), "/auth/login/?next=%2Fdashboard%2F");
        assert_eq!(
            login_url_with_next("/artworks/upload/?a=1"),
            "/auth/login/?next=%2Fartworks%2Fupload%2F%3Fa%3D1"
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/artworks/upload/")), Some("/artworks/upload/"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_safe_next_rejects_control_and_whitespace() {
        assert_eq!(safe_next(Some("/\t/evil.example/")), None);
        assert_eq!(safe_next(Some("/\n/evil.example/")), None);
        assert_eq!(safe_next(Some("/dashboard/\r\nX-Injected: 1")), None);
        assert_eq!(safe_next(Some("/dash board/")), None);
        assert_eq!(safe_next(Some("/\u{a0}/evil.example/")), None);
        assert_eq!(safe_next(Some("/artworks/?q=a%20b")), Some("/artworks/?q=a%20b"));
    }
}
