//! Environment configuration

use std::time::Duration;
use thiserror::Error;
use crate::checkout::{AggregationPolicy, CheckoutSettings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub checkout: CheckoutSettings,
    pub nats_url: Option<String>,
    pub nats_subject: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let port = parse(&get, "PORT", 8083u16)?;
        let timeout_ms = parse(&get, "CHECKOUT_TIMEOUT_MS", 5000u64)?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid { key: "CHECKOUT_TIMEOUT_MS", value: "0".into(), reason: "must be positive".into() });
        }
        let aggregation = match get("CART_AGGREGATION") {
            Some(raw) => raw.parse::<AggregationPolicy>()
                .map_err(|e| ConfigError::Invalid { key: "CART_AGGREGATION", value: raw.clone(), reason: e.to_string() })?,
            None => AggregationPolicy::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            port,
            checkout: CheckoutSettings { deadline: Duration::from_millis(timeout_ms), aggregation },
            nats_url: get("NATS_URL"),
            nats_subject: get("NATS_SUBJECT").unwrap_or_else(|| "orders.placed".to_string()),
        })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid { key, value: raw.clone(), reason: e.to_string() }),
        None => Ok(default),
    }
}
