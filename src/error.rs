use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Invalid wallet address format for {0}")]
    InvalidAddress(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CivicError>;
