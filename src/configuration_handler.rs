use crate::availability::{CatalogError, SlotCatalog};
use crate::configuration::Configuration;
use crate::types::TimeSlot;
use chrono::Duration;
use std::env;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidTime { variable: &'static str, value: String },
    InvalidNumber { variable: &'static str, value: String },
    Catalog(CatalogError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime { variable, value } => {
                write!(f, "{variable}={value:?} is not a valid HH:MM time")
            }
            Self::InvalidNumber { variable, value } => {
                write!(f, "{variable}={value:?} is not a valid number")
            }
            Self::Catalog(err) => write!(f, "invalid booking schedule: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<CatalogError> for ConfigError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Environment-backed configuration. Every variable has a development
/// default; `DATABASE_URL` is the only one that changes which backend
/// the binary runs against.
#[derive(Debug, Clone)]
pub struct ConfigurationHandler {
    shop_name: String,
    admin_password: String,
    frontend_path: PathBuf,
    bind_address: String,
    database_url: Option<String>,
    catalog: SlotCatalog,
    lead_time_minutes: i64,
}

impl ConfigurationHandler {
    pub fn from_env(port_override: Option<u16>) -> Result<Self, ConfigError> {
        let shop_name = env::var("SHOP_NAME").unwrap_or_else(|_| "Barbershop".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123".to_string());
        let frontend_path = PathBuf::from(
            env::var("FRONTEND_PATH").unwrap_or_else(|_| "frontend/index.html".to_string()),
        );
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match port_override {
            Some(port) => port,
            None => parse_number("PORT", env::var("PORT").ok(), 3000)?,
        };

        let open = parse_slot("OPEN_TIME", env::var("OPEN_TIME").ok(), TimeSlot::from_minutes(9 * 60))?;
        let close = parse_slot("CLOSE_TIME", env::var("CLOSE_TIME").ok(), TimeSlot::from_minutes(20 * 60))?;
        let granularity = parse_number("SLOT_MINUTES", env::var("SLOT_MINUTES").ok(), 30u32)?;
        let lead_time_minutes =
            parse_number("LEAD_TIME_MINUTES", env::var("LEAD_TIME_MINUTES").ok(), 30i64)?;

        Ok(Self {
            shop_name,
            admin_password,
            frontend_path,
            bind_address: format!("{host}:{port}"),
            database_url: env::var("DATABASE_URL").ok(),
            catalog: SlotCatalog::new(open, close, granularity)?,
            lead_time_minutes,
        })
    }
}

fn parse_slot(
    variable: &'static str,
    value: Option<String>,
    default: TimeSlot,
) -> Result<TimeSlot, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidTime { variable, value: raw }),
        None => Ok(default),
    }
}

fn parse_number<N: std::str::FromStr>(
    variable: &'static str,
    value: Option<String>,
    default: N,
) -> Result<N, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { variable, value: raw }),
        None => Ok(default),
    }
}

impl Configuration for ConfigurationHandler {
    fn shop_name(&self) -> String {
        self.shop_name.clone()
    }

    fn admin_password(&self) -> String {
        self.admin_password.clone()
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn bind_address(&self) -> String {
        self.bind_address.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn slot_catalog(&self) -> SlotCatalog {
        self.catalog
    }

    fn booking_lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }
}
