use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_COLLECTION: &str = "books";
pub const DEFAULT_PAGE_SIZE: u64 = 5;
pub const DEFAULT_PAGE_COUNT: u64 = 2;
/// Each page is its own step, so the plan grows linearly with this.
pub const MAX_PAGE_COUNT: u64 = 1000;
pub const DEFAULT_APP_NAME: &str = "bookstore-queries";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub db_name: String,
    pub collection: String,
    pub app_name: String,
    pub settings: Settings,
}

/// Knobs that shape the query plan itself. Kept apart from the connection
/// details so the plan can be built without a database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub page_size: u64,
    pub page_count: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_count: DEFAULT_PAGE_COUNT,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    /// `uri` and `db` come from the command line and take precedence.
    pub fn from_env(uri: Option<String>, db: Option<String>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(uri, db, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(uri: Option<String>, db: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongo_uri = required(uri.or_else(|| lookup("MONGO_URI")), "MONGO_URI")?;
        let db_name = required(db.or_else(|| lookup("DB_NAME")), "DB_NAME")?;

        Ok(Config {
            mongo_uri,
            db_name,
            collection: non_blank(lookup("BOOKS_COLLECTION"))
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            app_name: non_blank(lookup("APP_NAME"))
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            settings: Settings::from_lookup(&lookup)?,
        })
    }
}

impl Settings {
    /// Paging knobs alone, for commands that never connect.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = parsed(lookup("PAGE_SIZE"), "PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "PAGE_SIZE",
                value: "0".to_string(),
                reason: "page size must be at least 1".to_string(),
            });
        }

        let page_count = parsed(lookup("PAGE_COUNT"), "PAGE_COUNT")?.unwrap_or(DEFAULT_PAGE_COUNT);
        if page_count > MAX_PAGE_COUNT {
            return Err(ConfigError::Invalid {
                name: "PAGE_COUNT",
                value: page_count.to_string(),
                reason: format!("at most {} pages can be printed", MAX_PAGE_COUNT),
            });
        }

        Ok(Settings { page_size, page_count })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    non_blank(value).ok_or(ConfigError::Missing(name))
}

fn parsed<T>(value: Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value: raw,
        }),
    }
}
