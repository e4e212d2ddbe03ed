use actix_session::Session;
use actix_web::{
    web::{Bytes, Data},
    HttpRequest,
};
use common::{
    api::{parse_json_body, ApiResponse, StatusMessage},
    error::{KlError, KlResult},
};
use log::info;
use serde::Serialize;

use super::{
    cookies::{csrf_cookie, missing_csrf_cookie, new_csrf_token},
    guard::{AuthenticatedUser, Identity},
};
use crate::{
    config::CookieConfig,
    data::user::{Credentials, User},
    service::{sessions::SESSION_USER_KEY, users::UserService},
};

/// Authentication state of the caller
#[derive(Serialize, Debug)]
pub struct SessionStatus {
    authenticated: bool,
    user: Option<User>,
}

impl SessionStatus {
    fn authenticated(user: User) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }
}

impl From<&Identity> for SessionStatus {
    fn from(identity: &Identity) -> Self {
        match identity.user() {
            Some(user) => Self::authenticated(user.clone()),
            None => Self {
                authenticated: false,
                user: None,
            },
        }
    }
}

/// API endpoint reporting whether the caller holds a session. Issues the CSRF cookie when the
/// caller does not have one yet.
pub async fn session_status(
    req: HttpRequest,
    identity: Identity,
    cookies: Data<CookieConfig>,
) -> ApiResponse<SessionStatus> {
    let response = ApiResponse::ok(SessionStatus::from(&identity));
    match missing_csrf_cookie(&req, &cookies) {
        Some(cookie) => response.with_cookie(cookie),
        None => response,
    }
}

/// API endpoint to start a session from a JSON `{username, password}` body. A session the caller
/// already holds is replaced by a new session key and the CSRF token is rotated.
pub async fn login<U>(
    session: Session,
    body: Bytes,
    users: Data<U>,
    cookies: Data<CookieConfig>,
) -> KlResult<ApiResponse<SessionStatus>>
where
    U: UserService,
{
    let credentials: Credentials = parse_json_body(&body)?;
    let user = users.validate_user(&credentials).await?;
    session.renew();
    session
        .insert(SESSION_USER_KEY, &user)
        .map_err(|error| KlError::Generic(format!("Could not store the session user. {error}")))?;
    info!("User '{}' logged in", user.username());
    Ok(ApiResponse::ok(SessionStatus::authenticated(user))
        .with_cookie(csrf_cookie(new_csrf_token(), &cookies)))
}

/// API endpoint to end the caller's session
pub async fn logout(
    AuthenticatedUser(user): AuthenticatedUser,
    session: Session,
) -> ApiResponse<StatusMessage> {
    session.purge();
    info!("User '{}' logged out", user.username());
    ApiResponse::message("logged_out")
}
