use std::time::Duration;

use thiserror::Error;

/// Failure talking to the pattern store. A store returning zero rows is not
/// an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Pattern store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Pattern store query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed pattern store row: {0}")]
    Decode(String),

    #[error("Failed to apply pattern store migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid Hebrew date: year={year}, month={month}, day={day}")]
    InvalidHebrewDate { year: i32, month: u8, day: u8 },

    #[error("Invalid tag catalog: {0}")]
    Catalog(String),

    #[error("Failed to parse tag catalog: {0}")]
    CatalogParse(#[from] toml::de::Error),

    #[error("Failed to read tag catalog: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
