use super::error::DataLayerError;
use crate::model::presentation::{PresentationEntry, PresentationRequestOptions, PresentationState};
use crate::model::request_object::{PresentationDefinition, RequestObject};

/// Storage of presentation rows, one keyspace per tenant.
///
/// Writes follow last-writer-wins semantics; concurrent updates to the same
/// row are not coordinated here.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait PresentationRepository: Send + Sync {
    /// Insert a fresh row in `presentation-requested` state with a newly
    /// generated nonce. An existing row with the same id is replaced.
    async fn create_request(
        &self,
        tenant_id: &str,
        options: &PresentationRequestOptions,
        definition: &PresentationDefinition,
    ) -> Result<(), DataLayerError>;

    async fn get_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<Option<PresentationEntry>, DataLayerError>;

    async fn get_by_request_id(
        &self,
        tenant_id: &str,
        request_id: &str,
    ) -> Result<Option<PresentationEntry>, DataLayerError>;

    async fn list_by_group(
        &self,
        tenant_id: &str,
        group_id: &str,
    ) -> Result<Vec<PresentationEntry>, DataLayerError>;

    async fn update_state(
        &self,
        tenant_id: &str,
        id: &str,
        state: PresentationState,
    ) -> Result<(), DataLayerError>;

    async fn assign_group(
        &self,
        tenant_id: &str,
        id: &str,
        group_id: &str,
    ) -> Result<(), DataLayerError>;

    /// Upsert the row for an externally fetched request object, resetting it
    /// to `presentation-requested`. Missing rows are created.
    async fn store_request_object(
        &self,
        tenant_id: &str,
        request_id: &str,
        id: &str,
        request_object: &RequestObject,
    ) -> Result<(), DataLayerError>;

    /// Attach the received presentation blob and move the row to
    /// `presentation-received`.
    async fn store_presentation(
        &self,
        tenant_id: &str,
        id: &str,
        presentation: &[u8],
    ) -> Result<(), DataLayerError>;
}
