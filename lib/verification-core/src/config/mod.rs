use thiserror::Error;

pub mod core_config;

#[derive(Debug, Error)]
pub enum ConfigParsingError {
    #[error("Parsing error: {0}")]
    GeneralParsingError(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("Missing configuration field: {0}")]
    MissingField(String),
}
