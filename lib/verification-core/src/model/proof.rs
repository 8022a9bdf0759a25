use serde::{Deserialize, Serialize};

use super::submission::DescriptorEntry;

/// Body of a proof transmission request. The capitalized wire keys are part
/// of the contract with existing submitters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProofPayload {
    #[serde(default)]
    pub payload: Vec<FilterResult>,
    #[serde(default)]
    pub sign_namespace: String,
    #[serde(default)]
    pub sign_key: String,
    #[serde(default)]
    pub sign_group: String,
    #[serde(default)]
    pub holder_did: String,
}

/// Credentials selected for one input descriptor of the definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: DescriptorEntry,
    #[serde(default)]
    pub credentials: Vec<serde_json::Value>,
}
