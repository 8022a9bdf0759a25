use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestQueryRestDTO {
    /// Correlation id assigned by the caller, resolvable via the internal api.
    #[serde(default)]
    pub request_id: String,
    /// Base64url encoded presentation definition JSON.
    #[serde(default)]
    pub presentation_definition: String,
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
pub struct AuthorizeQueryRestDTO {
    pub client_id: Option<String>,
    pub request_uri: Option<String>,
    /// Overrides the configured wallet authorization endpoint, may be
    /// percent encoded. Unparsable overrides are ignored.
    #[serde(rename = "authUrl")]
    pub auth_url: Option<String>,
}

/// Direct post body of the wallet response.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct ProofSubmissionFormRestDTO {
    /// Verifiable presentation, a JSON-LD object or an array of them.
    #[serde(default)]
    pub vp_token: String,
    /// Presentation submission mapping the definition descriptors onto the
    /// token.
    #[serde(default)]
    pub presentation_submission: String,
}
