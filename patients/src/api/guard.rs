use std::future::{ready, Ready};

use actix_session::SessionExt;
use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use common::error::{KlError, KlResult};

use super::cookies::{CSRF_COOKIE, CSRF_HEADER};
use crate::{data::user::User, password::constant_time_eq, service::sessions::SESSION_USER_KEY};

/// Who is making the current request, as resolved from the session by [identify]
#[derive(Debug, Clone)]
pub enum Identity {
    /// No live session holds a user
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req
            .extensions()
            .get::<Self>()
            .cloned()
            .unwrap_or(Self::Anonymous);
        ready(Ok(identity))
    }
}

/// Extractor for handlers behind [require_authentication]. Fails with
/// [KlError::AuthenticationRequired] when the request has no live session.
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = KlError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match req.extensions().get::<Identity>() {
            Some(Identity::Authenticated(user)) => Ok(Self(user.clone())),
            _ => Err(KlError::AuthenticationRequired),
        };
        ready(user)
    }
}

/// Read the logged in user from the session of the `req`
fn resolve_identity(req: &ServiceRequest) -> KlResult<Identity> {
    let user = req
        .get_session()
        .get::<User>(SESSION_USER_KEY)
        .map_err(|error| KlError::Generic(format!("Could not read the session state. {error}")))?;
    Ok(user.map_or(Identity::Anonymous, Identity::Authenticated))
}

/// Double submit check of the CSRF cookie against the CSRF header
fn verify_csrf(req: &HttpRequest) -> KlResult<()> {
    let Some(cookie) = req.cookie(CSRF_COOKIE) else {
        return Err(KlError::CsrfRejected("CSRF cookie not set."));
    };
    let Some(header) = req.headers().get(CSRF_HEADER) else {
        return Err(KlError::CsrfRejected("CSRF token missing."));
    };
    if cookie.value().is_empty()
        || !constant_time_eq(header.as_bytes(), cookie.value().as_bytes())
    {
        return Err(KlError::CsrfRejected("CSRF token incorrect."));
    }
    Ok(())
}

/// Middleware placing the request's [Identity] in the request extensions. State changing
/// requests from authenticated clients must pass the CSRF check before reaching any handler.
/// # Errors
/// Failures are rendered as responses. The [Err] variant only carries errors from the wrapped
/// service.
pub async fn identify<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let identity = match resolve_identity(&req) {
        Ok(identity) => identity,
        Err(error) => return Ok(req.error_response(error).map_into_right_body()),
    };
    if matches!(identity, Identity::Authenticated(_)) && !req.method().is_safe() {
        if let Err(error) = verify_csrf(req.request()) {
            return Ok(req.error_response(error).map_into_right_body());
        }
    }
    req.extensions_mut().insert(identity);
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

/// Middleware rejecting requests that [identify] did not resolve to a live session
/// # Errors
/// Rejections are rendered as responses. The [Err] variant only carries errors from the wrapped
/// service.
pub async fn require_authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let authenticated = matches!(
        req.extensions().get::<Identity>(),
        Some(Identity::Authenticated(_))
    );
    if !authenticated {
        return Ok(req
            .error_response(KlError::AuthenticationRequired)
            .map_into_right_body());
    }
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
mod test {
    use actix_web::{cookie::Cookie, test::TestRequest};
    use common::error::KlError;
    use rstest::rstest;

    use super::verify_csrf;
    use crate::api::cookies::{CSRF_COOKIE, CSRF_HEADER};

    #[test]
    fn verify_csrf_should_accept_matching_token() {
        let req = TestRequest::post()
            .cookie(Cookie::new(CSRF_COOKIE, "token"))
            .insert_header((CSRF_HEADER, "token"))
            .to_http_request();

        assert!(verify_csrf(&req).is_ok());
    }

    #[rstest]
    #[case::no_cookie(None, Some("token"), "CSRF cookie not set.")]
    #[case::no_header(Some("token"), None, "CSRF token missing.")]
    #[case::mismatch(Some("token"), Some("other"), "CSRF token incorrect.")]
    #[case::empty(Some(""), Some(""), "CSRF token incorrect.")]
    fn verify_csrf_should_reject(
        #[case] cookie: Option<&str>,
        #[case] header: Option<&str>,
        #[case] reason: &str,
    ) {
        let mut builder = TestRequest::post();
        if let Some(cookie) = cookie {
            builder = builder.cookie(Cookie::new(CSRF_COOKIE, cookie.to_owned()));
        }
        if let Some(header) = header {
            builder = builder.insert_header((CSRF_HEADER, header.to_owned()));
        }

        let result = verify_csrf(&builder.to_http_request());

        assert!(
            matches!(result, Err(KlError::CsrfRejected(message)) if message == reason),
            "Expected CSRF rejection '{reason}'"
        );
    }
}
