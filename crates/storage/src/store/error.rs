#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("database does not exist: {}", .0.display())]
    MissingDatabase(PathBuf),
    #[error("not a gravity database (missing tables: {})", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
