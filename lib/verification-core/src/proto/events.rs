//! Payload contracts for broker traffic. Field casing is part of the wire
//! contract with neighbouring services and is pinned by tests.

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::model::presentation::PresentationState;
use crate::model::request_object::PresentationDefinition;

pub const EVENT_TYPE_PRESENTATION_AUTHORIZATION: &str = "verifier.presentation.authorization";
pub const EVENT_TYPE_PRESENTATION_AUTHORIZATION_ERROR: &str =
    "verifier.presentation.authorization.error";
pub const EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE: &str =
    "verifier.presentation.authorization.remote";
pub const EVENT_TYPE_PROOF_NOTIFY: &str = "verifier.proof.notification";
pub const EVENT_TYPE_SIGN_TOKEN: &str = "signer.signToken";
pub const EVENT_TYPE_STORE_PRESENTATION: &str = "storage.presentation.store";

/// Identification carried by every request payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBase {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub group_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBase {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplyError {
    pub status: u16,
    pub msg: String,
}

/// Request to mint a presentation row, delivered over the request topic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationAuthorizationRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(rename = "presentationDefinition", default)]
    pub presentation_definition: PresentationDefinition,
    #[serde(default)]
    pub ttl: u64,
    #[serde(default)]
    pub tenant_uri: String,
    #[serde(default)]
    pub target_uri: String,
    #[serde(rename = "requestobject_uri", default)]
    pub request_object_uri: String,
}

/// Answer to a creation request. The base reply nests under `BaseReply`, a
/// shape consumers already rely on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationAuthorizationReply {
    #[serde(rename = "BaseReply")]
    pub base_reply: ReplyBase,
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub request_uri: String,
}

/// Authorization handed in over messaging instead of the HTTP authorize
/// endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteAuthorizationRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(default)]
    pub request_uri: String,
    #[serde(default)]
    pub ttl: u64,
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteAuthorizationReply {
    #[serde(flatten)]
    pub base: ReplyBase,
}

/// Status notification published whenever a row advances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProofNotifyEvent {
    #[serde(flatten)]
    pub base: ReplyBase,
    pub presentation_id: String,
    pub status: PresentationState,
}

/// A received presentation on its way to the storage pipeline.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePresentationMessage {
    #[serde(flatten)]
    pub base: RequestBase,
    pub account_id: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
    pub id: String,
}

/// RPC payload asking the signer service to mint a request object token.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub key: String,
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub payload: Vec<u8>,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTokenReply {
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub token: Vec<u8>,
}
