use common::{database::PgConnectionBuilder, env::env_var_or};
use log::{error, info};
use patients::database::{build_database, db_options};

#[tokio::main]
async fn main() {
    let log_config = match env_var_or(
        "KLINIKA_LOG_CONFIG",
        "patients/patients_db_build_log.yml".to_owned(),
    ) {
        Ok(inner) => inner,
        Err(error) => {
            eprintln!("Could not read the log config path. {error}");
            return;
        }
    };
    if let Err(error) = log4rs::init_file(log_config, Default::default()) {
        eprintln!("Could not initialize log4rs. {error}");
        return;
    }
    let options = match db_options() {
        Ok(inner) => inner,
        Err(error) => {
            error!("Error fetching database options. {error}");
            return;
        }
    };
    let pool = match PgConnectionBuilder::create_pool(options, 1, 1).await {
        Ok(inner) => inner,
        Err(error) => {
            error!("Could not create a connection pool for database building. {error}");
            return;
        }
    };
    match build_database(&pool).await {
        Ok(()) => info!("Klinika database schema is up to date"),
        Err(error) => error!("Could not build the klinika database. {error}"),
    }
}
