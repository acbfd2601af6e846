#[macro_use]
extern crate rocket;

use mongodb::{Client, Database};
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::error::{BackendError, ConfigurationError};
use crate::route::mount_api;

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod route;

/// Loads environment and configuration, connects to MongoDB and assembles
/// the server. Startup failures are returned instead of aborting mid-way.
pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let db = client.database(c.mongodb_db.as_str());

    if let Err(e) = db.list_collection_names(None).await {
        tracing::error!("Unable to connect to MongoDB.");
        return Err(e.into());
    }

    tracing::info!("Starting HTTP server...");
    Ok(build_rocket(c, db))
}

/// Assembles the Rocket instance from an already established database handle.
/// The handle and the configuration are the only shared state.
pub fn build_rocket(c: Config, db: Database) -> Rocket<Build> {
    let allowed_origins = AllowedOrigins::some_exact(&c.allowed_origins);

    let cors = rocket_cors::CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
    .expect("Unable to configure CORS.");

    let r = rocket::build().manage(c).manage(db).attach(cors);
    mount_api(r)
}
