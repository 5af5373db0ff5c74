//! Error types for PrintQuote

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrintQuoteError>;

#[derive(Error, Debug)]
pub enum PrintQuoteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PrintQuoteError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PrintQuoteError::InvalidInput(_) => 3,
            PrintQuoteError::Api(ApiError::Unauthorized(_)) => 2,
            PrintQuoteError::Api(_) => 1,
            PrintQuoteError::Config(_) => 1,
            PrintQuoteError::Storage(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(String),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("'{0}' was not saved")]
    NotSaved(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for PrintQuoteError {
    fn from(err: reqwest::Error) -> Self {
        PrintQuoteError::Api(err.into())
    }
}
