use serde_json::Value;
use uuid::Uuid;

use super::ProofSubmissionService;
use crate::model::presentation::PresentationState;
use crate::model::submission::{FORMAT_JWT_VC, FORMAT_LDP_VP, PresentationSubmission};
use crate::proto::events::{
    EVENT_TYPE_STORE_PRESENTATION, RequestBase, StoragePresentationMessage,
};
use crate::proto::messaging_client::Event;
use crate::service::error::{EntityNotFoundError, ServiceError, ValidationError};

impl ProofSubmissionService {
    /// Verify a posted `vp_token` and either persist it or mark the row
    /// rejected.
    ///
    /// A rejected presentation still answers `Ok`: the submitter must not be
    /// able to probe which presentations would be accepted.
    pub async fn submit_proof(
        &self,
        tenant_id: &str,
        id: &str,
        vp_token: &str,
        presentation_submission: &str,
    ) -> Result<(), ServiceError> {
        let vp_token = vp_token.replace('\n', "");
        let presentation_submission = presentation_submission.replace('\n', "");
        if vp_token.is_empty() {
            return Err(ValidationError::MissingFormData("vp_token".to_owned()).into());
        }
        if presentation_submission.is_empty() {
            return Err(
                ValidationError::MissingFormData("presentation_submission".to_owned()).into(),
            );
        }

        let submission: PresentationSubmission = serde_json::from_str(&presentation_submission)
            .map_err(|error| ValidationError::MalformedSubmission(error.to_string()))?;
        submission.validate()?;

        // the token is a single JSON document, the descriptor paths address
        // it as a one element list
        let element: Value = serde_json::from_str(&vp_token)
            .map_err(|error| ValidationError::MalformedVpToken(error.to_string()))?;
        let elements = vec![element];

        for entry in &submission.descriptor_map {
            if entry.format == FORMAT_JWT_VC {
                // jwt credentials show up in submissions but cannot be
                // verified yet
                return Err(ValidationError::UnsupportedFormat(entry.format.clone()).into());
            }
            if entry.format != FORMAT_LDP_VP {
                return Err(ValidationError::UnsupportedFormat(entry.format.clone()).into());
            }
        }

        let mut valid = true;
        for (index, _) in submission.descriptor_map.iter().enumerate() {
            let element = element_at(&elements, index)?;
            match self.signer_client.verify_presentation(element).await {
                Ok(verdict) => valid &= verdict,
                Err(error) => {
                    tracing::error!(%error, "presentation verification failed");
                    return Err(error.into());
                }
            }
        }

        if !valid {
            self.presentation_repository
                .update_state(tenant_id, id, PresentationState::Rejected)
                .await?;
            // deliberately Ok, the sender must not learn which presentations
            // get accepted
            return Ok(());
        }

        for (index, _) in submission.descriptor_map.iter().enumerate() {
            let element = element_at(&elements, index)?;
            let row = self.presentation_repository.get_by_id(tenant_id, id).await?;
            let Some(row) = row else {
                return Err(EntityNotFoundError::Presentation(id.to_owned()).into());
            };
            if row.request_id.is_empty() {
                return Err(EntityNotFoundError::Presentation(id.to_owned()).into());
            }

            let presentation = serde_json::to_vec(element)
                .map_err(|error| ServiceError::MappingError(error.to_string()))?;
            self.presentation_repository
                .store_presentation(tenant_id, id, &presentation)
                .await?;
            self.forward_presentation(tenant_id, &row.request_id, &row.group_id, presentation)
                .await;
            self.request_service
                .publish_status(tenant_id, &row.request_id, id, PresentationState::Received)
                .await;
        }

        Ok(())
    }

    /// Hand the accepted presentation to the storage pipeline. Failures are
    /// logged, the wallet facing answer does not depend on them.
    async fn forward_presentation(
        &self,
        tenant_id: &str,
        request_id: &str,
        group_id: &str,
        presentation: Vec<u8>,
    ) {
        let message = StoragePresentationMessage {
            base: RequestBase {
                tenant_id: tenant_id.to_owned(),
                request_id: request_id.to_owned(),
                group_id: group_id.to_owned(),
            },
            account_id: group_id.to_owned(),
            message_type: EVENT_TYPE_STORE_PRESENTATION.to_owned(),
            payload: presentation,
            id: Uuid::new_v4().to_string(),
        };
        let data = match serde_json::to_value(&message) {
            Ok(data) => data,
            Err(error) => {
                tracing::error!(%error, "storage message could not be encoded");
                return;
            }
        };

        let event = Event::new(EVENT_TYPE_STORE_PRESENTATION, data);
        if let Err(error) = self
            .messaging
            .publish(&self.config.topics.storage_request, event)
            .await
        {
            tracing::error!(%error, "presentation could not be forwarded to storage");
        }
    }
}

fn element_at(elements: &[Value], index: usize) -> Result<&Value, ServiceError> {
    elements.get(index).ok_or_else(|| {
        ValidationError::MalformedSubmission(format!(
            "descriptor {index} has no matching vp_token element"
        ))
        .into()
    })
}
