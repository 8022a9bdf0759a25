//! In-process presentation store. Rows live in per-tenant maps and behave
//! like the durable store they stand in for: blobs stay base64 encoded at
//! rest and rows expire once their ttl has passed.

use std::sync::Arc;

use verification_core::repository::presentation_repository::PresentationRepository;

use crate::presentation::PresentationProvider;

pub mod presentation;

#[derive(Clone)]
pub struct DataLayer {
    presentation_repository: Arc<dyn PresentationRepository>,
}

impl DataLayer {
    /// `region` and `country` name the partition every row is written to.
    pub fn create(region: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            presentation_repository: Arc::new(PresentationProvider::new(region, country)),
        }
    }

    pub fn get_presentation_repository(&self) -> Arc<dyn PresentationRepository> {
        self.presentation_repository.clone()
    }
}
