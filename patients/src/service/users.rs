use common::error::{KlError, KlResult};
use log::error;

use crate::{
    data::user::{Credentials, User},
    password::{check_password, run_dummy_check},
};

/// Credential verification for users provisioned outside of the API
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Verify the `credentials` against the stored password hash. If successful, the matching
    /// [User] is returned.
    /// # Errors
    /// This function will return [KlError::InvalidCredentials] if the username is unknown or the
    /// password does not match
    async fn validate_user(&self, credentials: &Credentials) -> KlResult<User>;
}

/// Check the `credentials` against the `stored` user and password hash found for the username.
/// Hashing runs on the blocking pool. An unreadable stored hash is logged and rejected like a
/// wrong password.
/// # Errors
/// This function will return [KlError::InvalidCredentials] if no user was found or the password
/// does not match, or [KlError::Join] if the hashing task fails
pub(crate) async fn authenticate(
    credentials: &Credentials,
    stored: Option<(User, String)>,
    iterations: u32,
) -> KlResult<User> {
    let password = credentials.password.clone();
    let Some((user, hash)) = stored else {
        tokio::task::spawn_blocking(move || run_dummy_check(&password, iterations)).await?;
        return Err(KlError::InvalidCredentials);
    };
    match tokio::task::spawn_blocking(move || check_password(&password, &hash)).await? {
        Ok(true) => Ok(user),
        Ok(false) => Err(KlError::InvalidCredentials),
        Err(error) => {
            error!("Could not verify password for user '{}'. {error}", user.username());
            Err(KlError::InvalidCredentials)
        }
    }
}
