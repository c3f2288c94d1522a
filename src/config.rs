use std::env;

use crate::error::CruiseError;

pub const HOST: &str = "0.0.0.0";
pub const PORT: u16 = 8080;
pub const DATABASE_NAME: &str = "serendip";
pub const MAIL_FROM: &str = "info@serendipwaves.com";
pub const MAIL_FROM_NAME: &str = "Serendip Waves";

#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub mail: MailConfig,
}

impl AppConfig {
    /// Reads the process environment. `MONGODB_URI` is the only required key.
    pub fn from_env() -> Result<Self, CruiseError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, CruiseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("PORT '{}' is not a valid port, using {}", raw, PORT);
                PORT
            }),
            None => PORT,
        };
        let mongodb_uri = get("MONGODB_URI")
            .ok_or_else(|| CruiseError::Validation("MONGODB_URI must be set".to_string()))?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| HOST.to_string()),
            port,
            mongodb_uri,
            database_name: get("DATABASE_NAME").unwrap_or_else(|| DATABASE_NAME.to_string()),
            mail: MailConfig {
                sendgrid_api_key: get("SENDGRID_API_KEY"),
                from_email: get("MAIL_FROM").unwrap_or_else(|| MAIL_FROM.to_string()),
                from_name: get("MAIL_FROM_NAME").unwrap_or_else(|| MAIL_FROM_NAME.to_string()),
            },
        })
    }
}
