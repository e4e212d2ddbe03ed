use serde::{Deserialize, Serialize};

/// Identity of an authenticated user as exposed to API callers
#[derive(Deserialize, Serialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
}

impl User {
    pub const fn new(id: i64, username: String) -> Self {
        Self { id, username }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Login request body. Missing values are treated as empty strings.
#[derive(Deserialize, Debug, Default)]
pub struct Credentials {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
