use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLayerError {
    #[error("Record not updated")]
    RecordNotUpdated,

    #[error("Response could not be mapped")]
    MappingError,

    #[error("Database error: {0}")]
    Db(#[from] anyhow::Error),
}
