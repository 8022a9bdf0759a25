use ct_codecs::{Base64NoPadding, Decoder, Encoder};
use serde_json::Value;
use verification_core::model::presentation::PresentationEntry;
use verification_core::model::request_object::PresentationDefinition;
use verification_core::repository::error::DataLayerError;

use super::StoredPresentation;

pub(super) fn encode_blob(bytes: &[u8]) -> Result<String, DataLayerError> {
    Base64NoPadding::encode_to_string(bytes).map_err(|_| DataLayerError::MappingError)
}

pub(super) fn encode_definition(
    definition: &PresentationDefinition,
) -> Result<String, DataLayerError> {
    let bytes = serde_json::to_vec(definition).map_err(|_| DataLayerError::MappingError)?;
    encode_blob(&bytes)
}

fn decode_blob(encoded: &str) -> Result<Vec<u8>, DataLayerError> {
    Base64NoPadding::decode_to_vec(encoded, None).map_err(|_| DataLayerError::MappingError)
}

fn decode_definition(encoded: &str) -> Result<Option<PresentationDefinition>, DataLayerError> {
    if encoded.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&decode_blob(encoded)?)
        .map(Some)
        .map_err(|_| DataLayerError::MappingError)
}

/// Blobs hold either a list of elements or one bare element; both decode to
/// the list form callers see.
fn decode_presentation(encoded: &str) -> Result<Option<Vec<Value>>, DataLayerError> {
    if encoded.is_empty() {
        return Ok(None);
    }
    let bytes = decode_blob(encoded)?;
    if let Ok(elements) = serde_json::from_slice::<Vec<Value>>(&bytes) {
        return Ok(Some(elements));
    }
    let element: Value =
        serde_json::from_slice(&bytes).map_err(|_| DataLayerError::MappingError)?;
    Ok(Some(vec![element]))
}

pub(super) fn entry_from_stored(
    stored: &StoredPresentation,
) -> Result<PresentationEntry, DataLayerError> {
    Ok(PresentationEntry {
        region: stored.region.clone(),
        country: stored.country.clone(),
        id: stored.id.clone(),
        request_id: stored.request_id.clone(),
        group_id: stored.group_id.clone(),
        presentation_definition: decode_definition(&stored.definition)?,
        presentation: decode_presentation(&stored.presentation)?,
        redirect_uri: stored.redirect_uri.clone(),
        response_uri: stored.response_uri.clone(),
        response_mode: stored.response_mode.clone(),
        response_type: stored.response_type.clone(),
        state: stored.state,
        last_update: stored.last_update,
        nonce: stored.nonce.clone(),
        client_id: stored.client_id.clone(),
    })
}
