use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Executor, PgPool,
};

use crate::{env::env_var, error::KlResult};

/// Builds postgres connection pools
pub struct PgConnectionBuilder;

impl PgConnectionBuilder {
    /// Return a new pool of database connections. Requires the connection `options` and min/max
    /// number of connections to hold.
    /// # Errors
    /// This function will return an error if the initial connections cannot be established
    pub async fn create_pool(
        options: PgConnectOptions,
        max_connections: u32,
        min_connection: u32,
    ) -> KlResult<PgPool> {
        let pool = PgPoolOptions::new()
            .min_connections(min_connection)
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(pool)
    }

    /// Return a new pool of database connection with connections not explicitly created. Requires
    /// the connection `options` and min/max number of connections to hold.
    pub fn create_pool_lazy(
        options: PgConnectOptions,
        max_connections: u32,
        min_connection: u32,
    ) -> PgPool {
        PgPoolOptions::new()
            .min_connections(min_connection)
            .max_connections(max_connections)
            .connect_lazy_with(options)
    }
}

/// Return database connect options read from the environment variables starting with `prefix`.
/// For a prefix of `KLINIKA` the variables are `KLINIKA_HOST`, `KLINIKA_PORT`, `KLINIKA_DB`,
/// `KLINIKA_USER` and `KLINIKA_PASSWORD`.
/// # Errors
/// This function will return an error if any of the variables are missing or the port is not an
/// integer
pub fn db_options_from_env(prefix: &str) -> KlResult<PgConnectOptions> {
    let port: u16 = env_var(&format!("{prefix}_PORT"))?;
    let options = PgConnectOptions::new()
        .host(&env_var::<String>(&format!("{prefix}_HOST"))?)
        .port(port)
        .database(&env_var::<String>(&format!("{prefix}_DB"))?)
        .username(&env_var::<String>(&format!("{prefix}_USER"))?)
        .password(&env_var::<String>(&format!("{prefix}_PASSWORD"))?);
    Ok(options)
}

/// Run a block of one or more SQL statements against the `pool` using the simple query protocol
/// # Errors
/// This function will return an error if any statement in the `script` fails
pub async fn execute_script(script: &str, pool: &PgPool) -> KlResult<()> {
    pool.execute(script).await?;
    Ok(())
}
