use thiserror::Error;
use verification_crypto::CapabilityKeyError;

use crate::model::request_object::DefinitionValidationError;
use crate::model::submission::SubmissionValidationError;
use crate::proto::messaging_client::MessagingError;
use crate::provider::policy::PolicyError;
use crate::provider::request_object::FetchError;
use crate::provider::signer::SignerClientError;
use crate::repository::error::DataLayerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFoundError),
    #[error(transparent)]
    BusinessLogic(#[from] BusinessLogicError),
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Data layer error: {0}")]
    Repository(#[from] DataLayerError),
    #[error("Capability token error: {0}")]
    CapabilityToken(#[from] CapabilityKeyError),
    #[error("Policy evaluation error: {0}")]
    Policy(#[from] PolicyError),
    #[error("Request object error: {0}")]
    RequestObject(#[from] FetchError),
    #[error("Signer error: {0}")]
    Signer(#[from] SignerClientError),
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
    #[error("Presentation could not be transmitted: {0}")]
    Transmit(String),

    #[error("Mapping error: `{0}`")]
    MappingError(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum EntityNotFoundError {
    #[error("Presentation `{0}` not found")]
    Presentation(String),
    #[error("Presentation with request id `{0}` not found")]
    PresentationByRequestId(String),
}

#[derive(Debug, Error)]
pub enum BusinessLogicError {
    #[error("policy forbids the processing")]
    PolicyDenied,
    #[error("unsupported response mode `{0}`")]
    UnsupportedResponseMode(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid presentation definition: {0}")]
    Definition(#[from] DefinitionValidationError),
    #[error("Invalid presentation submission: {0}")]
    Submission(#[from] SubmissionValidationError),
    #[error("Malformed presentation submission: {0}")]
    MalformedSubmission(String),
    #[error("Malformed vp_token: {0}")]
    MalformedVpToken(String),
    #[error("Unsupported presentation format `{0}`")]
    UnsupportedFormat(String),
    #[error("Missing form field `{0}`")]
    MissingFormData(String),
    #[error("Authorize endpoint could not be parsed: {0}")]
    UnparsableAuthorizeEndpoint(String),
}

impl From<DefinitionValidationError> for ServiceError {
    fn from(value: DefinitionValidationError) -> Self {
        ServiceError::Validation(value.into())
    }
}

impl From<SubmissionValidationError> for ServiceError {
    fn from(value: SubmissionValidationError) -> Self {
        ServiceError::Validation(value.into())
    }
}
