use std::collections::HashMap;

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::{DateTime, Utc};
use common::error::KlResult;
use sqlx::PgPool;

use crate::service::sessions::{expires_at, new_session_key, ExpiringSessionStore};

/// Postgresql implementation of [SessionStore]. Session state is kept as a JSON object in
/// `klinika.sessions`.
#[derive(Clone)]
pub struct PgSessionStore {
    /// Postgres database connection pool used by this service
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    async fn insert(
        &self,
        session_state: &HashMap<String, String>,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let state = serde_json::to_string(session_state)
            .map_err(|error| SaveError::Serialization(error.into()))?;
        let key = new_session_key();
        sqlx::query(
            r#"
            insert into klinika.sessions(session_key, session_state, expire_date)
            values($1, $2, $3)"#,
        )
        .bind(&key)
        .bind(state)
        .bind(expires_at(Utc::now(), ttl))
        .execute(&self.pool)
        .await
        .map_err(|error| SaveError::Other(error.into()))?;
        SessionKey::try_from(key).map_err(|error| SaveError::Other(error.into()))
    }
}

#[async_trait::async_trait(?Send)]
impl SessionStore for PgSessionStore {
    async fn load(
        &self,
        session_key: &SessionKey,
    ) -> Result<Option<HashMap<String, String>>, LoadError> {
        let state: Option<String> = sqlx::query_scalar(
            r#"
            select session_state
            from klinika.sessions
            where session_key = $1 and expire_date > now()"#,
        )
        .bind(session_key.as_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| LoadError::Other(error.into()))?;
        state
            .map(|state| serde_json::from_str(&state))
            .transpose()
            .map_err(|error| LoadError::Deserialization(error.into()))
    }

    async fn save(
        &self,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        self.insert(&session_state, ttl).await
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let state = serde_json::to_string(&session_state)
            .map_err(|error| UpdateError::Serialization(error.into()))?;
        let result = sqlx::query(
            r#"
            update klinika.sessions
            set session_state = $2, expire_date = $3
            where session_key = $1"#,
        )
        .bind(session_key.as_ref())
        .bind(state)
        .bind(expires_at(Utc::now(), ttl))
        .execute(&self.pool)
        .await
        .map_err(|error| UpdateError::Other(error.into()))?;
        if result.rows_affected() > 0 {
            return Ok(session_key);
        }
        match self.insert(&session_state, ttl).await {
            Ok(key) => Ok(key),
            Err(SaveError::Serialization(error)) => Err(UpdateError::Serialization(error)),
            Err(SaveError::Other(error)) => Err(UpdateError::Other(error)),
        }
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> anyhow::Result<()> {
        sqlx::query("update klinika.sessions set expire_date = $2 where session_key = $1")
            .bind(session_key.as_ref())
            .bind(expires_at(Utc::now(), ttl))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> anyhow::Result<()> {
        sqlx::query("delete from klinika.sessions where session_key = $1")
            .bind(session_key.as_ref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExpiringSessionStore for PgSessionStore {
    async fn clear_expired(&self, now: DateTime<Utc>) -> KlResult<u64> {
        let result = sqlx::query("delete from klinika.sessions where expire_date <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use actix_session::storage::SessionStore;
    use actix_web::cookie::time::Duration;
    use rstest::rstest;
    use sqlx::PgPool;

    use super::PgSessionStore;
    use crate::service::postgres::test::database;

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn update_should_replace_state_and_keep_key(database: PgPool) -> anyhow::Result<()> {
        let store = PgSessionStore::new(&database);
        let key = store
            .save(HashMap::from([("user".to_owned(), "1".to_owned())]), &Duration::days(1))
            .await?;
        let state = HashMap::from([("user".to_owned(), "2".to_owned())]);

        let updated = store.update(key, state.clone(), &Duration::days(1)).await?;

        assert_eq!(store.load(&updated).await?, Some(state));
        store.delete(&updated).await?;
        assert_eq!(store.load(&updated).await?, None);
        Ok(())
    }

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn load_should_ignore_expired_session(database: PgPool) -> anyhow::Result<()> {
        let store = PgSessionStore::new(&database);
        let key = store.save(HashMap::new(), &Duration::seconds(-1)).await?;

        assert_eq!(store.load(&key).await?, None);
        store.delete(&key).await?;
        Ok(())
    }
}
