use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, str::FromStr};

use crate::services::{
    ledger::{DEFAULT_MAX_BULK_ITEMS, DEFAULT_MAX_COMMENT_LENGTH},
    DayCountPolicy, LedgerSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in_memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("Invalid STORAGE_BACKEND value: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_addr: SocketAddr,
    pub time_zone: Tz,
    pub day_count_policy: DayCountPolicy,
    pub max_bulk_items: usize,
    pub max_decision_comment_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 10,
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            time_zone: Tz::UTC,
            day_count_policy: DayCountPolicy::default(),
            max_bulk_items: DEFAULT_MAX_BULK_ITEMS,
            max_decision_comment_length: DEFAULT_MAX_COMMENT_LENGTH,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL");
        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL is required when STORAGE_BACKEND=postgres"));
        }

        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            var("DATABASE_MAX_CONNECTIONS"),
            defaults.database_max_connections,
        )?;

        let server_addr = parse_or("SERVER_ADDR", var("SERVER_ADDR"), defaults.server_addr)?;

        let time_zone_name = var("APP_TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let day_count_policy = match var("LEAVE_DAY_COUNT_POLICY") {
            Some(value) => value
                .parse()
                .map_err(|err: String| anyhow!("Invalid LEAVE_DAY_COUNT_POLICY value: {}", err))?,
            None => defaults.day_count_policy,
        };

        let max_bulk_items: usize =
            parse_or("MAX_BULK_ITEMS", var("MAX_BULK_ITEMS"), defaults.max_bulk_items)?;
        if max_bulk_items == 0 {
            return Err(anyhow!("MAX_BULK_ITEMS must be greater than zero"));
        }

        let max_decision_comment_length = parse_or(
            "MAX_DECISION_COMMENT_LENGTH",
            var("MAX_DECISION_COMMENT_LENGTH"),
            defaults.max_decision_comment_length,
        )?;

        Ok(Config {
            storage_backend,
            database_url,
            database_max_connections,
            server_addr,
            time_zone,
            day_count_policy,
            max_bulk_items,
            max_decision_comment_length,
        })
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            day_count_policy: self.day_count_policy,
            max_bulk_items: self.max_bulk_items,
            max_comment_length: self.max_decision_comment_length,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {}", key, value)),
        None => Ok(default),
    }
}
