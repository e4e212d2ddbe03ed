use actix_session::storage::SessionStore;
use actix_web::cookie::time::Duration;
use chrono::{DateTime, Utc};
use common::error::KlResult;
use uuid::Uuid;

/// Session state key holding the logged in [User][crate::data::user::User]
pub const SESSION_USER_KEY: &str = "user";

/// Backing storage for the session middleware. Each worker holds a clone, so clones must share
/// the same sessions.
#[async_trait::async_trait]
pub trait ExpiringSessionStore: SessionStore + Clone + Send + Sync + 'static {
    /// Remove every session that expired before `now`, returning the number removed
    async fn clear_expired(&self, now: DateTime<Utc>) -> KlResult<u64>;
}

/// Generate a new random session key
pub fn new_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Expiry instant of a session saved at `now` with the middleware's `ttl`
pub(crate) fn expires_at(now: DateTime<Utc>, ttl: &Duration) -> DateTime<Utc> {
    now + chrono::Duration::seconds(ttl.whole_seconds())
}
