use one_dto_mapper::{From, Into, convert_inner};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use utoipa::ToSchema;
use verification_core::model::presentation::{PresentationEntry, PresentationState};
use verification_core::model::proof::{FilterResult, ProofPayload};
use verification_core::model::request_object::PresentationDefinition;
use verification_core::model::submission::DescriptorEntry;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, ToSchema, From)]
#[from(PresentationState)]
pub enum ProofStateRestEnum {
    #[serde(rename = "presentation-requested")]
    Requested,
    #[serde(rename = "request-object-fetched")]
    RequestObjectFetched,
    #[serde(rename = "presentation-received")]
    Received,
    #[serde(rename = "presentation-rejected")]
    Rejected,
    #[serde(rename = "presentation-transmitted")]
    Transmitted,
}

/// Presentation row as handed to internal consumers. The irregular casing of
/// `groupid` and `lastUpdateTimeStamp` is part of the wire contract.
#[derive(Clone, Debug, Serialize, ToSchema, From)]
#[from(PresentationEntry)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponseRestDTO {
    pub region: String,
    pub country: String,
    pub id: String,
    pub request_id: String,
    #[serde(rename = "groupid")]
    pub group_id: String,
    #[schema(value_type = Option<Object>)]
    pub presentation_definition: Option<PresentationDefinition>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub presentation: Option<Vec<Value>>,
    pub redirect_uri: String,
    pub response_uri: String,
    pub response_mode: String,
    pub response_type: String,
    pub state: ProofStateRestEnum,
    #[serde(rename = "lastUpdateTimeStamp", with = "time::serde::rfc3339")]
    #[schema(value_type = String, example = "2023-06-09T14:19:57.000Z")]
    pub last_update: OffsetDateTime,
    pub nonce: String,
    pub client_id: String,
}

/// Body of a proof transmission request, capitalized keys as submitted by
/// the existing callers.
#[derive(Clone, Debug, Deserialize, ToSchema, Into)]
#[into(ProofPayload)]
#[serde(rename_all = "PascalCase")]
pub struct ProofRequestRestDTO {
    #[serde(default)]
    #[into(with_fn = convert_inner)]
    pub payload: Vec<FilterResultRestDTO>,
    #[serde(default)]
    pub sign_namespace: String,
    #[serde(default)]
    pub sign_key: String,
    #[serde(default)]
    pub sign_group: String,
    #[serde(default)]
    pub holder_did: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema, Into)]
#[into(FilterResult)]
pub struct FilterResultRestDTO {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: DescriptorEntryRestDTO,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub credentials: Vec<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema, Into)]
#[into(DescriptorEntry)]
pub struct DescriptorEntryRestDTO {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub path: String,
}
