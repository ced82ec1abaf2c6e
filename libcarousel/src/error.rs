//! Error types for the carousel engine
//!
//! The resolution core itself is total and never fails. Errors only exist at
//! the edges: loading configuration files, decoding persisted block data and
//! talking to a content search provider.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CarouselError>;

#[derive(Error, Debug)]
pub enum CarouselError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CarouselError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CarouselError::InvalidInput(_) => 3,
            CarouselError::Search(SearchError::Unavailable(_)) => 2,
            CarouselError::Search(_) => 1,
            CarouselError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug, Clone)]
pub enum SearchError {
    #[error("Search provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}
