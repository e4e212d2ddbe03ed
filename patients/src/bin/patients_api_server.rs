use common::{database::PgConnectionBuilder, env::env_var_or, error::KlResult};
use log::info;
use patients::{
    api,
    config::{demo_credentials, ServerConfig, StorageKind},
    database::db_options,
    password::DEFAULT_ITERATIONS,
    service::{
        memory::{
            patients::MemoryPatientService, sessions::MemorySessionStore, users::MemoryUserService,
        },
        postgres::{patients::PgPatientService, sessions::PgSessionStore, users::PgUserService},
    },
};

#[actix_web::main]
async fn main() -> KlResult<()> {
    let log_config: String = env_var_or(
        "KLINIKA_LOG_CONFIG",
        "patients/patients_api_server_log.yml".to_owned(),
    )?;
    log4rs::init_file(log_config, Default::default())
        .map_err(|error| format!("Could not initialize log4rs. {error}"))?;
    let config = ServerConfig::from_env()?;
    match config.storage {
        StorageKind::Postgres => {
            let pool = PgConnectionBuilder::create_pool(db_options()?, 20, 10).await?;
            api::spawn_api_server(
                PgPatientService::new(&pool),
                PgUserService::new(&pool),
                PgSessionStore::new(&pool),
                config,
            )
            .await?;
        }
        StorageKind::Memory => {
            let (username, password) = demo_credentials()?;
            info!("Running with in memory storage as '{username}'");
            api::spawn_api_server(
                MemoryPatientService::default(),
                MemoryUserService::new(DEFAULT_ITERATIONS).with_user(&username, &password),
                MemorySessionStore::default(),
                config,
            )
            .await?;
        }
    }
    Ok(())
}
