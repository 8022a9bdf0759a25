use serde_json::{Value, json};

use super::ProofService;
use crate::model::presentation::{PresentationEntry, PresentationState};
use crate::model::proof::{FilterResult, ProofPayload};
use crate::model::submission::PresentationSubmission;
use crate::service::error::{EntityNotFoundError, ServiceError};

impl ProofService {
    pub async fn get_proof(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<PresentationEntry, ServiceError> {
        let row = self.presentation_repository.get_by_id(tenant_id, id).await?;
        let Some(row) = row else {
            return Err(EntityNotFoundError::Presentation(id.to_owned()).into());
        };
        Ok(row)
    }

    /// Lookup by the caller supplied correlation id instead of the row id.
    pub async fn get_proof_by_request_id(
        &self,
        tenant_id: &str,
        request_id: &str,
    ) -> Result<PresentationEntry, ServiceError> {
        let row = self
            .presentation_repository
            .get_by_request_id(tenant_id, request_id)
            .await?;
        let Some(row) = row else {
            return Err(EntityNotFoundError::PresentationByRequestId(request_id.to_owned()).into());
        };
        Ok(row)
    }

    pub async fn assign_group(
        &self,
        tenant_id: &str,
        id: &str,
        group_id: &str,
    ) -> Result<(), ServiceError> {
        self.presentation_repository
            .assign_group(tenant_id, id, group_id)
            .await?;
        Ok(())
    }

    pub async fn list_proofs(
        &self,
        tenant_id: &str,
        group_id: &str,
    ) -> Result<Vec<PresentationEntry>, ServiceError> {
        Ok(self
            .presentation_repository
            .list_by_group(tenant_id, group_id)
            .await?)
    }

    /// Sign the credentials selected for each filter and post them to the
    /// response endpoint recorded on the row.
    pub async fn create_proof(
        &self,
        tenant_id: &str,
        id: &str,
        payload: &ProofPayload,
    ) -> Result<(), ServiceError> {
        let signed = self.sign_presentations(payload).await?;
        let row = self.get_proof(tenant_id, id).await?;
        self.transmit(tenant_id, &row, payload, signed).await
    }

    /// Same completion flow, addressed by correlation id.
    pub async fn create_proof_by_request_id(
        &self,
        tenant_id: &str,
        request_id: &str,
        payload: &ProofPayload,
    ) -> Result<(), ServiceError> {
        let signed = self.sign_presentations(payload).await?;
        let row = self.get_proof_by_request_id(tenant_id, request_id).await?;
        self.transmit(tenant_id, &row, payload, signed).await
    }

    /// One signed token per filter result. Signing runs before the row
    /// lookup so a broken signer surfaces first.
    async fn sign_presentations(
        &self,
        payload: &ProofPayload,
    ) -> Result<Vec<Vec<u8>>, ServiceError> {
        let mut signed = Vec::with_capacity(payload.payload.len());
        for filter in &payload.payload {
            let request = json!({
                "group": payload.sign_group,
                "issuer": payload.holder_did,
                "key": payload.sign_key,
                "namespace": payload.sign_namespace,
                "presentation": presentation_envelope(filter, &payload.holder_did),
            });
            signed.push(self.signer_client.sign_presentation(&request).await?);
        }
        Ok(signed)
    }

    async fn transmit(
        &self,
        tenant_id: &str,
        row: &PresentationEntry,
        payload: &ProofPayload,
        signed: Vec<Vec<u8>>,
    ) -> Result<(), ServiceError> {
        for presentation in &signed {
            // TODO decide whether a failed transmission should be retried
            self.post_response(row, payload, presentation).await?;
        }

        self.presentation_repository
            .update_state(tenant_id, &row.id, PresentationState::Transmitted)
            .await?;
        Ok(())
    }

    async fn post_response(
        &self,
        row: &PresentationEntry,
        payload: &ProofPayload,
        presentation: &[u8],
    ) -> Result<(), ServiceError> {
        let descriptors = payload
            .payload
            .iter()
            .map(|filter| filter.description.clone())
            .collect();
        let definition_id = row
            .presentation_definition
            .as_ref()
            .map(|definition| definition.id.clone())
            .unwrap_or_default();
        let submission = PresentationSubmission::from_descriptors(definition_id, descriptors);
        let submission = serde_json::to_string(&submission)
            .map_err(|error| ServiceError::MappingError(error.to_string()))?;

        let vp_token = String::from_utf8_lossy(presentation);
        let form = [
            ("vp_token", vp_token.as_ref()),
            ("presentation_submission", submission.as_str()),
        ];
        let response = self
            .http_client
            .post(&row.response_uri)
            .form(&form)
            .map_err(|error| ServiceError::MappingError(error.to_string()))?
            .send()
            .await
            .map_err(|error| ServiceError::Transmit(error.to_string()))?;

        if response.status.0 != 200 {
            return Err(ServiceError::Transmit(format!(
                "response uri {} responded an error: {}",
                row.response_uri,
                String::from_utf8_lossy(&response.body),
            )));
        }
        Ok(())
    }
}

/// Minimal W3C presentation wrapper around the selected credentials.
fn presentation_envelope(filter: &FilterResult, holder_did: &str) -> Value {
    json!({
        "@context": [
            "https://www.w3.org/2018/credentials/v1",
            "https://w3id.org/security/suites/jws-2020/v1",
        ],
        "type": ["VerifiablePresentation"],
        "verifiableCredential": filter.credentials,
        "id": filter.id,
        "holder": holder_did,
    })
}
