use std::collections::HashMap;

use common::error::KlResult;

use crate::{
    data::user::{Credentials, User},
    password::make_password,
    service::users::{authenticate, UserService},
};

/// In memory implementation of [UserService]. Users are provisioned when the service is built.
pub struct MemoryUserService {
    /// Username mapped to the user and their password hash
    users: HashMap<String, (User, String)>,
    /// Last id handed out
    last_id: i64,
    /// PBKDF2 iteration count for new hashes and rejected lookups
    iterations: u32,
}

impl MemoryUserService {
    pub fn new(iterations: u32) -> Self {
        Self {
            users: HashMap::new(),
            last_id: 0,
            iterations,
        }
    }

    /// Add a user, hashing the `password`. An existing user keeps their id and gets the new
    /// password.
    #[must_use]
    pub fn with_user(self, username: &str, password: &str) -> Self {
        let hash = make_password(password, self.iterations);
        self.with_password_hash(username, hash)
    }

    /// Add a user with an already encoded password `hash`
    #[must_use]
    pub fn with_password_hash(mut self, username: &str, hash: String) -> Self {
        if let Some((_, stored)) = self.users.get_mut(username) {
            *stored = hash;
            return self;
        }
        self.last_id += 1;
        let user = User::new(self.last_id, username.to_owned());
        self.users.insert(username.to_owned(), (user, hash));
        self
    }
}

#[async_trait::async_trait]
impl UserService for MemoryUserService {
    async fn validate_user(&self, credentials: &Credentials) -> KlResult<User> {
        let stored = self.users.get(&credentials.username).cloned();
        authenticate(credentials, stored, self.iterations).await
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use common::error::KlError;
    use rstest::rstest;

    use super::MemoryUserService;
    use crate::{data::user::Credentials, service::users::UserService};

    #[rstest]
    #[case::wrong_password("tester", "wrong-pass")]
    #[case::unknown_user("nobody", "safe-pass-123")]
    #[case::empty("", "")]
    #[tokio::test]
    async fn validate_user_should_reject_bad_credentials(
        #[case] username: &str,
        #[case] password: &str,
    ) {
        let service = MemoryUserService::new(1_000).with_user("tester", "safe-pass-123");

        let result = service
            .validate_user(&Credentials::new(username, password))
            .await;

        assert!(
            matches!(result, Err(KlError::InvalidCredentials)),
            "Expected invalid credentials"
        );
    }

    #[tokio::test]
    async fn validate_user_should_return_user_when_password_matches() {
        let service = MemoryUserService::new(1_000)
            .with_user("first", "first-pass")
            .with_user("tester", "safe-pass-123");

        let user = service
            .validate_user(&Credentials::new("tester", "safe-pass-123"))
            .await
            .expect("Credentials should be valid");

        assert_eq!(user.id(), 2);
        assert_eq!(user.username(), "tester");
    }

    #[tokio::test]
    async fn with_user_should_keep_ids_unique_when_password_reset() {
        let service = MemoryUserService::new(1_000)
            .with_user("first", "first-pass")
            .with_user("first", "new-pass")
            .with_user("second", "second-pass");

        let first = service
            .validate_user(&Credentials::new("first", "new-pass"))
            .await
            .expect("Reset password should be valid");
        let second = service
            .validate_user(&Credentials::new("second", "second-pass"))
            .await
            .expect("Credentials should be valid");

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }

    #[tokio::test]
    async fn validate_user_should_reject_unreadable_hash() {
        let service =
            MemoryUserService::new(1_000).with_password_hash("tester", "md5$abc".to_owned());

        let result = service
            .validate_user(&Credentials::new("tester", "safe-pass-123"))
            .await;

        assert!(
            matches!(result, Err(KlError::InvalidCredentials)),
            "Expected invalid credentials"
        );
    }

    #[tokio::test]
    async fn validate_user_should_not_block_other_tasks() {
        let service = MemoryUserService::new(200_000);
        let credentials = Credentials::new("nobody", "safe-pass-123");
        let ticks = AtomicUsize::new(0);
        let ticker = async {
            loop {
                tokio::time::sleep(Duration::from_millis(1)).await;
                ticks.fetch_add(1, Ordering::Relaxed);
            }
        };

        tokio::select! {
            result = service.validate_user(&credentials) => {
                assert!(matches!(result, Err(KlError::InvalidCredentials)));
            }
            _ = ticker => unreachable!("Ticker never completes"),
        }

        assert!(
            ticks.load(Ordering::Relaxed) >= 3,
            "Other tasks should run while the password is hashed"
        );
    }
}
