#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use serendip_api::{
    db::{memory::MemoryStore, store::CruiseStore},
    error::CruiseError,
    models::{
        pricing::CabinTypePricing,
        ship::{Itinerary, Ship},
        user::UserProfile,
    },
    routes,
    services::mail_service::Mailer,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> Result<(), CruiseError> {
        if self.fail {
            return Err(CruiseError::Mail("relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.fail
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Two ships: "Ocean Star" (id 1, 1000 passengers) with id-keyed pricing
    /// on "Caribbean", and "Sea Breeze" (id 2, 400 passengers) whose pricing
    /// row on "Mediterranean" only carries its name.
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let store = MemoryStore::new();
        seed(&store);
        Self {
            store: Arc::new(store),
            mailer: Arc::new(mailer),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let store: Arc<dyn CruiseStore> = self.store.clone();
        let mailer: Arc<dyn Mailer> = self.mailer.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::from(store))
            .app_data(web::Data::from(mailer))
            .configure(routes::configure)
    }
}

fn seed(store: &MemoryStore) {
    store.add_ship(Ship {
        ship_id: 1,
        ship_name: "Ocean Star".to_string(),
        passenger_count: 1000,
        ship_class: Some("Luxury".to_string()),
        year_built: Some(2018),
    });
    store.add_ship(Ship {
        ship_id: 2,
        ship_name: "Sea Breeze".to_string(),
        passenger_count: 400,
        ship_class: Some("Classic".to_string()),
        year_built: Some(2005),
    });

    store.add_itinerary(Itinerary {
        ship_id: Some(1),
        ship_name: "Ocean Star".to_string(),
        route: "Caribbean".to_string(),
        duration_days: Some(10),
        start_date: Some("2025-12-01".to_string()),
        end_date: Some("2025-12-11".to_string()),
    });
    store.add_itinerary(Itinerary {
        ship_id: Some(1),
        ship_name: "Ocean Star".to_string(),
        route: "Alaska".to_string(),
        duration_days: None,
        start_date: Some("2026-06-01".to_string()),
        end_date: Some("2026-06-08".to_string()),
    });
    store.add_itinerary(Itinerary {
        ship_id: Some(2),
        ship_name: "Sea Breeze".to_string(),
        route: "Mediterranean".to_string(),
        duration_days: None,
        start_date: None,
        end_date: None,
    });

    store.add_pricing(CabinTypePricing {
        ship_id: Some(1),
        ship_name: "Ocean Star".to_string(),
        route: "Caribbean".to_string(),
        interior_price: Some(800.0),
        ocean_view_price: Some(1100.0),
        balcony_price: Some(1500.0),
        suite_price: Some(3000.0),
    });
    store.add_pricing(CabinTypePricing {
        ship_id: Some(1),
        ship_name: "Ocean Star".to_string(),
        route: "Alaska".to_string(),
        interior_price: Some(600.0),
        ocean_view_price: Some(700.0),
        balcony_price: Some(900.0),
        suite_price: Some(1200.0),
    });
    store.add_pricing(CabinTypePricing {
        ship_id: None,
        ship_name: "Sea Breeze".to_string(),
        route: "Mediterranean".to_string(),
        interior_price: Some(500.0),
        ocean_view_price: Some(650.0),
        balcony_price: None,
        suite_price: Some(1800.0),
    });

    store.add_user(UserProfile {
        id: 5,
        full_name: "Nimal Perera".to_string(),
        email: "nimal@example.com".to_string(),
        date_of_birth: Some("1985-04-12".to_string()),
        gender: Some("Male".to_string()),
        phone_number: None,
        passport_number: None,
        created_at: None,
    });
}
