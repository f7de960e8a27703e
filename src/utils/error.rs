use thiserror::Error;

#[derive(Error, Debug)]
pub enum NpgError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Could not parse '{path}': {message}")]
    ParseError { path: String, message: String },

    #[error("'{type_name}' cannot be populated from configuration: {reason}")]
    InvalidDataType { type_name: String, reason: String },

    #[error("Could not populate '{type_name}' from section '{section}': {message}")]
    DeserializeError {
        type_name: String,
        section: String,
        message: String,
    },

    #[error("{reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("Logging setup failed: {message}")]
    LoggingError { message: String },
}

pub type Result<T> = std::result::Result<T, NpgError>;
