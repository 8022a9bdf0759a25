use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use verification_core::model::presentation::{
    PresentationEntry, PresentationRequestOptions, PresentationState,
};
use verification_core::model::request_object::{PresentationDefinition, RequestObject};
use verification_core::repository::error::DataLayerError;
use verification_core::repository::presentation_repository::PresentationRepository;
use verification_crypto::utilities::generate_nonce;

use super::mapper::{encode_blob, encode_definition, entry_from_stored};
use super::{PresentationProvider, StoredPresentation};

fn expired(stored: &StoredPresentation, now: OffsetDateTime) -> bool {
    stored.expires_at.is_some_and(|expiry| expiry <= now)
}

#[async_trait]
impl PresentationRepository for PresentationProvider {
    async fn create_request(
        &self,
        tenant_id: &str,
        options: &PresentationRequestOptions,
        definition: &PresentationDefinition,
    ) -> Result<(), DataLayerError> {
        let definition = encode_definition(definition)?;
        let now = OffsetDateTime::now_utc();
        let expires_at = (options.ttl > 0)
            .then(|| Duration::seconds(i64::try_from(options.ttl).unwrap_or(i64::MAX)))
            .and_then(|ttl| now.checked_add(ttl));

        let stored = StoredPresentation {
            region: self.region.clone(),
            country: self.country.clone(),
            id: options.id.clone(),
            request_id: options.request_id.clone(),
            group_id: options.group_id.clone(),
            definition,
            presentation: String::new(),
            redirect_uri: String::new(),
            response_uri: String::new(),
            response_mode: String::new(),
            response_type: String::new(),
            state: PresentationState::Requested,
            last_update: now,
            nonce: generate_nonce(),
            client_id: String::new(),
            expires_at,
        };

        let mut store = self.store.write().await;
        store
            .entry(tenant_id.to_owned())
            .or_default()
            .insert(options.id.clone(), stored);
        Ok(())
    }

    async fn get_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<Option<PresentationEntry>, DataLayerError> {
        let now = OffsetDateTime::now_utc();
        let store = self.store.read().await;
        let Some(stored) = store.get(tenant_id).and_then(|rows| rows.get(id)) else {
            return Ok(None);
        };
        if expired(stored, now) {
            return Ok(None);
        }
        entry_from_stored(stored).map(Some)
    }

    async fn get_by_request_id(
        &self,
        tenant_id: &str,
        request_id: &str,
    ) -> Result<Option<PresentationEntry>, DataLayerError> {
        let now = OffsetDateTime::now_utc();
        let store = self.store.read().await;
        let Some(stored) = store
            .get(tenant_id)
            .and_then(|rows| rows.values().find(|stored| stored.request_id == request_id))
        else {
            return Ok(None);
        };
        if expired(stored, now) {
            return Ok(None);
        }
        entry_from_stored(stored).map(Some)
    }

    async fn list_by_group(
        &self,
        tenant_id: &str,
        group_id: &str,
    ) -> Result<Vec<PresentationEntry>, DataLayerError> {
        let now = OffsetDateTime::now_utc();
        let store = self.store.read().await;
        let Some(rows) = store.get(tenant_id) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for stored in rows.values() {
            if stored.group_id != group_id || expired(stored, now) {
                continue;
            }
            entries.push(entry_from_stored(stored)?);
        }
        Ok(entries)
    }

    async fn update_state(
        &self,
        tenant_id: &str,
        id: &str,
        state: PresentationState,
    ) -> Result<(), DataLayerError> {
        let now = OffsetDateTime::now_utc();
        let mut store = self.store.write().await;
        let Some(stored) = store.get_mut(tenant_id).and_then(|rows| rows.get_mut(id)) else {
            return Err(DataLayerError::RecordNotUpdated);
        };
        if expired(stored, now) {
            return Err(DataLayerError::RecordNotUpdated);
        }
        stored.state = state;
        stored.last_update = now;
        Ok(())
    }

    async fn assign_group(
        &self,
        tenant_id: &str,
        id: &str,
        group_id: &str,
    ) -> Result<(), DataLayerError> {
        let now = OffsetDateTime::now_utc();
        let mut store = self.store.write().await;
        let Some(stored) = store.get_mut(tenant_id).and_then(|rows| rows.get_mut(id)) else {
            return Err(DataLayerError::RecordNotUpdated);
        };
        if expired(stored, now) {
            return Err(DataLayerError::RecordNotUpdated);
        }
        stored.group_id = group_id.to_owned();
        stored.last_update = now;
        Ok(())
    }

    async fn store_request_object(
        &self,
        tenant_id: &str,
        request_id: &str,
        id: &str,
        request_object: &RequestObject,
    ) -> Result<(), DataLayerError> {
        let definition = match &request_object.presentation_definition {
            Some(definition) => encode_definition(definition)?,
            None => String::new(),
        };
        let now = OffsetDateTime::now_utc();
        let mut store = self.store.write().await;
        let rows = store.entry(tenant_id.to_owned()).or_default();

        // rows minted here never expire, external requests carry no ttl
        let mut stored = match rows.remove(id) {
            Some(stored) if !expired(&stored, now) => stored,
            _ => StoredPresentation::blank(
                self.region.clone(),
                self.country.clone(),
                id.to_owned(),
                now,
            ),
        };
        stored.state = PresentationState::Requested;
        stored.last_update = now;
        stored.definition = definition;
        stored.redirect_uri = request_object.redirect_uri.clone();
        stored.nonce = request_object.nonce.clone();
        stored.request_id = request_id.to_owned();
        stored.response_uri = request_object.response_uri.clone();
        stored.response_mode = request_object.response_mode.clone();
        stored.response_type = request_object.response_type.clone();
        stored.client_id = request_object.client_id.clone();
        rows.insert(id.to_owned(), stored);
        Ok(())
    }

    async fn store_presentation(
        &self,
        tenant_id: &str,
        id: &str,
        presentation: &[u8],
    ) -> Result<(), DataLayerError> {
        let blob = encode_blob(presentation)?;
        let now = OffsetDateTime::now_utc();
        let mut store = self.store.write().await;
        let Some(stored) = store.get_mut(tenant_id).and_then(|rows| rows.get_mut(id)) else {
            return Err(DataLayerError::RecordNotUpdated);
        };
        if expired(stored, now) {
            return Err(DataLayerError::RecordNotUpdated);
        }
        stored.state = PresentationState::Received;
        stored.presentation = blob;
        stored.last_update = now;
        Ok(())
    }
}
