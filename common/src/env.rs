use std::{fmt::Display, str::FromStr};

use crate::error::{KlError, KlResult};

/// Read and parse the environment variable `name`
/// # Errors
/// This function will return an error if the variable is not set or cannot be parsed into `T`
pub fn env_var<T>(name: &str) -> KlResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = std::env::var(name)?;
    value.parse().map_err(|error| {
        KlError::Generic(format!(
            "Environment variable '{name}' has an invalid value '{value}'. {error}"
        ))
    })
}

/// Read and parse the environment variable `name`, falling back to `default` when the variable is
/// not set
/// # Errors
/// This function will return an error if the variable is set but cannot be parsed into `T`
pub fn env_var_or<T>(name: &str, default: T) -> KlResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(_) => env_var(name),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod test {
    use super::{env_var, env_var_or};

    #[test]
    fn env_var_or_should_use_default_when_missing() {
        let value: u16 = env_var_or("KLINIKA_COMMON_TEST_MISSING", 8000)
            .expect("Missing variable should fall back to default");
        assert_eq!(value, 8000);
    }

    #[test]
    fn env_var_should_fail_when_value_cannot_parse() {
        std::env::set_var("KLINIKA_COMMON_TEST_PORT", "not-a-port");
        let result = env_var::<u16>("KLINIKA_COMMON_TEST_PORT");
        assert!(result.is_err(), "Non numeric port should not parse");
    }
}
