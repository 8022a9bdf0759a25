use serde::{Deserialize, Serialize};
use strum::Display;
use time::OffsetDateTime;

use super::request_object::PresentationDefinition;

/// Lifecycle of a presentation row. Wire values are shared with downstream
/// consumers of the status notifications and must not change.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, Serialize, Deserialize)]
pub enum PresentationState {
    #[serde(rename = "presentation-requested")]
    #[strum(serialize = "presentation-requested")]
    Requested,
    #[serde(rename = "request-object-fetched")]
    #[strum(serialize = "request-object-fetched")]
    RequestObjectFetched,
    #[serde(rename = "presentation-received")]
    #[strum(serialize = "presentation-received")]
    Received,
    #[serde(rename = "presentation-rejected")]
    #[strum(serialize = "presentation-rejected")]
    Rejected,
    #[serde(rename = "presentation-transmitted")]
    #[strum(serialize = "presentation-transmitted")]
    Transmitted,
}

/// One row of the presentation store.
///
/// `id` is the capability token minted for the owning tenant; whoever can
/// present it may read and advance this row. `region` and `country` record
/// the partition the row was written to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationEntry {
    pub region: String,
    pub country: String,
    pub id: String,
    pub request_id: String,
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub presentation_definition: Option<PresentationDefinition>,
    pub presentation: Option<Vec<serde_json::Value>>,
    pub redirect_uri: String,
    pub response_uri: String,
    pub response_mode: String,
    pub response_type: String,
    pub state: PresentationState,
    #[serde(rename = "lastUpdateTimeStamp", with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
    pub nonce: String,
    pub client_id: String,
}

/// Parameters for minting a fresh presentation row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PresentationRequestOptions {
    pub id: String,
    pub request_id: String,
    pub group_id: String,
    /// Row lifetime in seconds, zero keeps the row indefinitely.
    pub ttl: u64,
}
