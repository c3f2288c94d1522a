use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;
use std::collections::HashMap;

use crate::{db::store::CruiseStore, services::mail_service::Mailer};

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: &str) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details.to_string()),
        }
    }

    fn error(details: String) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

pub async fn health_check(
    store: web::Data<dyn CruiseStore>,
    mailer: web::Data<dyn Mailer>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let database = check_database(store.get_ref()).await;
    let mail = check_mail(mailer.get_ref());

    if database.status != "ok" || mail.status != "ok" {
        health.status = "degraded".to_string();
    }
    health.services.insert("database".to_string(), database);
    health.services.insert("mail".to_string(), mail);

    HttpResponse::Ok().json(health)
}

async fn check_database(store: &dyn CruiseStore) -> ServiceStatus {
    match store.ping().await {
        Ok(()) => ServiceStatus::ok("Connected successfully to the database"),
        Err(e) => {
            error!("Database health check failed: {}", e);
            ServiceStatus::error(format!("Failed to connect: {}", e))
        }
    }
}

fn check_mail(mailer: &dyn Mailer) -> ServiceStatus {
    if mailer.is_configured() {
        ServiceStatus::ok("Mail delivery configured")
    } else {
        ServiceStatus::error("SENDGRID_API_KEY not configured".to_string())
    }
}
