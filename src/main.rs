use actix_web::{middleware, web, App, HttpServer};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub mod backend;
pub mod config;
pub mod content;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod nav;
pub mod query;
pub mod schema;
pub mod session;
pub mod validation;

use backend::supabase::SupabaseClient;
use config::{AppConfig, ConfigError, APP_NAME};
use crypto::SessionKey;
use handlers::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,arogya=debug")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err @ ConfigError::Missing("SESSION_KEY")) => {
            error!(
                "SESSION_KEY takes base64 of 32 random bytes, e.g. {}",
                SessionKey::generate().to_base64()
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };
    let client = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key)?;

    let state = web::Data::new(AppState::new(client, config.secure_cookies));
    let key = web::Data::new(config.session_key);

    info!(addr = %config.bind_addr, port = config.port, "starting {APP_NAME}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(key.clone())
            .configure(handlers::configure::<SupabaseClient>)
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
