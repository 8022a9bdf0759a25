use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use verification_core::model::presentation::PresentationState;

pub mod mapper;
pub mod repository;

#[cfg(test)]
mod test;

/// A row at rest. Definition and presentation blobs are base64 over JSON,
/// empty strings mean unset.
pub(crate) struct StoredPresentation {
    pub region: String,
    pub country: String,
    pub id: String,
    pub request_id: String,
    pub group_id: String,
    pub definition: String,
    pub presentation: String,
    pub redirect_uri: String,
    pub response_uri: String,
    pub response_mode: String,
    pub response_type: String,
    pub state: PresentationState,
    pub last_update: OffsetDateTime,
    pub nonce: String,
    pub client_id: String,
    /// Absolute expiry; `None` keeps the row indefinitely.
    pub expires_at: Option<OffsetDateTime>,
}

impl StoredPresentation {
    /// Blank row carrying only its partition values and id, no expiry.
    pub(crate) fn blank(region: String, country: String, id: String, now: OffsetDateTime) -> Self {
        Self {
            region,
            country,
            id,
            request_id: String::new(),
            group_id: String::new(),
            definition: String::new(),
            presentation: String::new(),
            redirect_uri: String::new(),
            response_uri: String::new(),
            response_mode: String::new(),
            response_type: String::new(),
            state: PresentationState::Requested,
            last_update: now,
            nonce: String::new(),
            client_id: String::new(),
            expires_at: None,
        }
    }
}

type TenantRows = HashMap<String, StoredPresentation>;

pub struct PresentationProvider {
    region: String,
    country: String,
    store: RwLock<HashMap<String, TenantRows>>,
}

impl PresentationProvider {
    pub fn new(region: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            country: country.into(),
            store: RwLock::default(),
        }
    }
}
