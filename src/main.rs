use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use chrono::Duration;
use taskledger::auth::{PasswordHasher, TokenKeys};
use taskledger::config::Config;
use taskledger::routes;
use taskledger::services::bootstrap;
use taskledger::state::AppState;
use taskledger::store::{MemoryStore, PgStore, Store};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    log::error!("Startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url, config.database_max_connections)
                .await
                .map_err(startup_error)?,
        ),
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on exit.");
            Arc::new(MemoryStore::new())
        }
    };

    let hasher = PasswordHasher::new(config.bcrypt_cost);
    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(store.as_ref(), &hasher, admin)
            .await
            .map_err(startup_error)?;
    }

    let state = web::Data::new(AppState::new(
        store,
        hasher,
        TokenKeys::from_secret(config.jwt_secret.as_bytes()),
        Duration::minutes(config.token_ttl_minutes),
    ));

    log::info!("Starting taskledger server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
