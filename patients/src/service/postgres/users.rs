use common::error::KlResult;
use sqlx::PgPool;

use crate::{
    data::user::{Credentials, User},
    password::{make_password, DEFAULT_ITERATIONS},
    service::users::{authenticate, UserService},
};

/// User row including the stored password hash
#[derive(sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password: String,
}

/// Postgresql implementation of [UserService]
#[derive(Clone)]
pub struct PgUserService {
    /// Postgres database connection pool used by this service
    pool: PgPool,
}

impl PgUserService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Create the user `username` or, if the user already exists, replace their password
    /// # Errors
    /// This function will return an error if the database upsert fails
    pub async fn upsert_user(
        &self,
        username: &str,
        password: &str,
        iterations: u32,
    ) -> KlResult<User> {
        let user = sqlx::query_as(
            r#"
            insert into klinika.users(username, password)
            values($1, $2)
            on conflict (username) do update set password = excluded.password
            returning id, username"#,
        )
        .bind(username)
        .bind(make_password(password, iterations))
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait::async_trait]
impl UserService for PgUserService {
    async fn validate_user(&self, credentials: &Credentials) -> KlResult<User> {
        let record: Option<UserRecord> = sqlx::query_as(
            r#"
            select u.id, u.username, u.password
            from klinika.users u
            where u.username = $1"#,
        )
        .bind(&credentials.username)
        .fetch_optional(&self.pool)
        .await?;
        let stored = record.map(|record| (User::new(record.id, record.username), record.password));
        authenticate(credentials, stored, DEFAULT_ITERATIONS).await
    }
}

#[cfg(test)]
mod test {
    use common::error::{KlError, KlResult};
    use rstest::rstest;
    use sqlx::PgPool;

    use super::PgUserService;
    use crate::{
        data::user::Credentials,
        service::{postgres::test::database, users::UserService},
    };

    /// Cleanup function for users that are created during tests
    async fn cleanup_user(username: &str, pool: &PgPool) -> KlResult<()> {
        sqlx::query("delete from klinika.users where username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(())
    }

    #[rstest]
    #[ignore = "requires the klinika test database"]
    #[tokio::test]
    async fn validate_user_should_succeed_when_password_matches(database: PgPool) -> KlResult<()> {
        let service = PgUserService::new(&database);
        let created = service.upsert_user("pg-tester", "safe-pass-123", 1_000).await?;

        let action = service
            .validate_user(&Credentials::new("pg-tester", "safe-pass-123"))
            .await;
        let rejected = service
            .validate_user(&Credentials::new("pg-tester", "wrong-pass"))
            .await;
        cleanup_user("pg-tester", &database).await?;

        assert_eq!(action?, created);
        assert!(matches!(rejected, Err(KlError::InvalidCredentials)));
        Ok(())
    }
}
