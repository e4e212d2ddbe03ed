use std::{collections::HashMap, sync::Arc};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::{DateTime, Utc};
use common::error::KlResult;
use tokio::sync::RwLock;

use crate::service::sessions::{expires_at, new_session_key, ExpiringSessionStore};

struct StoredSession {
    state: HashMap<String, String>,
    expires_at: DateTime<Utc>,
}

/// In memory session storage. Clones share the same sessions.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

#[async_trait::async_trait(?Send)]
impl SessionStore for MemorySessionStore {
    async fn load(
        &self,
        session_key: &SessionKey,
    ) -> Result<Option<HashMap<String, String>>, LoadError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(session_key.as_ref()) {
            Some(session) if session.expires_at <= Utc::now() => {
                sessions.remove(session_key.as_ref());
                Ok(None)
            }
            Some(session) => Ok(Some(session.state.clone())),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let key = new_session_key();
        self.sessions.write().await.insert(
            key.clone(),
            StoredSession {
                state: session_state,
                expires_at: expires_at(Utc::now(), ttl),
            },
        );
        SessionKey::try_from(key).map_err(|error| SaveError::Other(error.into()))
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        if let Some(session) = self.sessions.write().await.get_mut(session_key.as_ref()) {
            session.state = session_state;
            session.expires_at = expires_at(Utc::now(), ttl);
            return Ok(session_key);
        }
        match self.save(session_state, ttl).await {
            Ok(key) => Ok(key),
            Err(SaveError::Serialization(error)) => Err(UpdateError::Serialization(error)),
            Err(SaveError::Other(error)) => Err(UpdateError::Other(error)),
        }
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> anyhow::Result<()> {
        if let Some(session) = self.sessions.write().await.get_mut(session_key.as_ref()) {
            session.expires_at = expires_at(Utc::now(), ttl);
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> anyhow::Result<()> {
        self.sessions.write().await.remove(session_key.as_ref());
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExpiringSessionStore for MemorySessionStore {
    async fn clear_expired(&self, now: DateTime<Utc>) -> KlResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
