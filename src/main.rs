use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use news::config::Settings;
use news::db;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[rocket::main]
async fn main() {
    init_logging();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let pool = match db::init_pool(&settings) {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "failed to create database pool");
            std::process::exit(1);
        }
    };
    info!(pool_size = settings.pool_size, "database pool ready");

    if let Err(e) = news::rocket(pool).launch().await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
