use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    HttpRequest,
};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::config::CookieConfig;

/// HttpOnly cookie holding the session key, managed by the session middleware
pub const SESSION_COOKIE: &str = "sessionid";
/// Script readable cookie holding the CSRF token
pub const CSRF_COOKIE: &str = "csrftoken";
/// Request header that must echo the CSRF cookie on state changing requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

const CSRF_TOKEN_LENGTH: usize = 32;
const CSRF_COOKIE_DAYS: i64 = 365;

/// Generate a new random CSRF token
pub fn new_csrf_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn csrf_cookie(token: String, config: &CookieConfig) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, token)
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(Duration::days(CSRF_COOKIE_DAYS))
        .finish()
}

/// A new CSRF cookie if the client did not send one with the `req`
pub fn missing_csrf_cookie(req: &HttpRequest, config: &CookieConfig) -> Option<Cookie<'static>> {
    match req.cookie(CSRF_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => None,
        _ => Some(csrf_cookie(new_csrf_token(), config)),
    }
}

#[cfg(test)]
mod test {
    use actix_web::{cookie::Cookie, test::TestRequest};

    use super::{csrf_cookie, missing_csrf_cookie, new_csrf_token, CSRF_COOKIE};
    use crate::config::CookieConfig;

    #[test]
    fn new_csrf_token_should_be_alphanumeric() {
        let token = new_csrf_token();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, new_csrf_token());
    }

    #[test]
    fn csrf_cookie_should_be_script_readable() {
        let cookie = csrf_cookie("token".to_owned(), &CookieConfig::default());

        assert_ne!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn missing_csrf_cookie_should_only_issue_when_absent() {
        let config = CookieConfig::default();
        let without = TestRequest::default().to_http_request();
        let with = TestRequest::default()
            .cookie(Cookie::new(CSRF_COOKIE, "existing"))
            .to_http_request();

        assert!(missing_csrf_cookie(&without, &config).is_some());
        assert!(missing_csrf_cookie(&with, &config).is_none());
    }
}
