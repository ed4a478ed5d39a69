use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosError {
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Error reading catalog file {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Item '{0}' not found in catalog")]
    ItemNotFound(String),

    #[error("No pending bill found with ID: {0}")]
    PendingBillNotFound(u32),

    #[error("Invalid bill ID '{0}'. Use 'Show All Pending Bills' to see available IDs.")]
    InvalidBillId(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Error writing receipt {path}: {source}")]
    ReceiptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing revenue report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed receipt {path}: {reason}")]
    MalformedReceipt { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PosError>;
