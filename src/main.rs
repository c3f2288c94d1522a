use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

use serendip_api::{
    config::AppConfig,
    db::{mongo::create_mongo_client, mongo::MongoStore, store::CruiseStore},
    routes,
    services::mail_service::{Mailer, SendGridMailer},
};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    error!("Startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env().map_err(startup_error)?;

    let client = create_mongo_client(&config.mongodb_uri)
        .await
        .map_err(startup_error)?;
    let store: Arc<dyn CruiseStore> = Arc::new(MongoStore::new(client, &config.database_name));
    info!("Using database '{}'", config.database_name);

    let mailer: Arc<dyn Mailer> = Arc::new(SendGridMailer::new(config.mail.clone()));
    if !mailer.is_configured() {
        warn!("SENDGRID_API_KEY not set, confirmation emails will fail");
    }

    info!("Binding to {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::from(mailer.clone()))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
