//! Password hashes in the `pbkdf2_sha256$<iterations>$<salt>$<digest>` format, where the digest
//! is the standard base64 encoding of a 32 byte PBKDF2-HMAC-SHA256 output. Existing hashes in
//! this format verify without conversion.

use base64::{engine::general_purpose::STANDARD, Engine};
use common::error::{KlError, KlResult};
use pbkdf2::pbkdf2_hmac;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::Sha256;

pub const ALGORITHM: &str = "pbkdf2_sha256";
pub const DEFAULT_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 22;

fn digest(password: &str, salt: &str, iterations: u32) -> String {
    let mut output = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut output);
    STANDARD.encode(output)
}

/// Hash the `password` with a random salt
pub fn make_password(password: &str, iterations: u32) -> String {
    let salt: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect();
    let hash = digest(password, &salt, iterations);
    format!("{ALGORITHM}${iterations}${salt}${hash}")
}

/// Check the `password` against an `encoded` hash produced by [make_password]
/// # Errors
/// This function will return an error if the `encoded` value is not a supported hash
pub fn check_password(password: &str, encoded: &str) -> KlResult<bool> {
    let mut parts = encoded.splitn(4, '$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(hash)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(KlError::PasswordHash("Expected 4 '$' separated parts".to_owned()));
    };
    if algorithm != ALGORITHM {
        return Err(KlError::PasswordHash(format!(
            "Unsupported algorithm '{algorithm}'"
        )));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|error| KlError::PasswordHash(format!("Invalid iteration count. {error}")))?;
    Ok(constant_time_eq(
        digest(password, salt, iterations).as_bytes(),
        hash.as_bytes(),
    ))
}

/// Hash the `password` and discard the result. Run for logins that have no stored hash.
pub fn run_dummy_check(password: &str, iterations: u32) {
    let _ = digest(password, "dummysalt", iterations);
}

/// Compare two byte slices without exiting early on the first difference
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{check_password, constant_time_eq, make_password, ALGORITHM};

    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn make_password_should_verify_with_same_password() {
        let encoded = make_password("safe-pass-123", TEST_ITERATIONS);

        assert!(encoded.starts_with(&format!("{ALGORITHM}${TEST_ITERATIONS}$")));
        assert!(check_password("safe-pass-123", &encoded).expect("Hash should be readable"));
        assert!(!check_password("wrong-pass", &encoded).expect("Hash should be readable"));
    }

    #[test]
    fn make_password_should_salt_each_hash() {
        let first = make_password("safe-pass-123", TEST_ITERATIONS);
        let second = make_password("safe-pass-123", TEST_ITERATIONS);

        assert_ne!(first, second);
    }

    #[test]
    fn check_password_should_verify_known_hash() {
        let encoded = "pbkdf2_sha256$1000$seasalt$I2v7dFSqHq7cssl4DF+LIEYPx0ekOE9E3w/Ilt7T6UQ=";

        assert!(check_password("safe-pass-123", encoded).expect("Hash should be readable"));
        assert!(!check_password("safe-pass-124", encoded).expect("Hash should be readable"));
    }

    #[rstest]
    #[case::parts("pbkdf2_sha256$1000$salt")]
    #[case::algorithm("argon2$1000$salt$hash")]
    #[case::iterations("pbkdf2_sha256$many$salt$hash")]
    fn check_password_should_fail_when_hash_malformed(#[case] encoded: &str) {
        assert!(check_password("password", encoded).is_err());
    }

    #[rstest]
    #[case(b"token".as_slice(), b"token".as_slice(), true)]
    #[case(b"token".as_slice(), b"tokem".as_slice(), false)]
    #[case(b"token".as_slice(), b"token2".as_slice(), false)]
    fn constant_time_eq_should_compare_bytes(
        #[case] left: &[u8],
        #[case] right: &[u8],
        #[case] expected: bool,
    ) {
        assert_eq!(constant_time_eq(left, right), expected);
    }
}
