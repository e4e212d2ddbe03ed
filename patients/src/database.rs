use common::{
    database::{db_options_from_env, execute_script},
    error::KlResult,
};
use sqlx::{postgres::PgConnectOptions, PgPool};

/// Schema of the klinika database. Every statement is safe to run more than once.
pub const SCHEMA: &str = include_str!("../database/schema.sql");

/// Return database connect options from the `KLINIKA_*` environment variables
/// # Errors
/// This function will return an error if a connection variable is missing or invalid
pub fn db_options() -> KlResult<PgConnectOptions> {
    db_options_from_env("KLINIKA")
}

/// Create the klinika schema objects that do not exist yet
/// # Errors
/// This function will return an error if any schema statement fails
pub async fn build_database(pool: &PgPool) -> KlResult<()> {
    execute_script(SCHEMA, pool).await
}
