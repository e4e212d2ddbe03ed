use clap::Parser;
use common::{database::PgConnectionBuilder, error::KlResult};
use patients::{
    database::db_options, password::DEFAULT_ITERATIONS, service::postgres::users::PgUserService,
};

/// Create a klinika user, or reset the password of an existing one
#[derive(Parser)]
#[command(name = "create_user")]
struct Cli {
    /// Login name of the user
    username: String,
    /// Plain text password, stored as a PBKDF2 hash
    password: String,
    /// PBKDF2 iteration count of the stored hash
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,
}

#[tokio::main]
async fn main() -> KlResult<()> {
    let cli = Cli::parse();
    if cli.username.trim().is_empty() || cli.password.is_empty() {
        return Err("Username and password must not be empty".into());
    }
    let pool = PgConnectionBuilder::create_pool(db_options()?, 1, 1).await?;
    let user = PgUserService::new(&pool)
        .upsert_user(cli.username.trim(), &cli.password, cli.iterations)
        .await?;
    eprintln!("Saved user '{}' with id {}", user.username(), user.id());
    Ok(())
}
