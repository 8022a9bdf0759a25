use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

pub const RESPONSE_MODE_DIRECT_POST: &str = "direct_post";

/// Claims of an authorization request token fetched from a wallet host.
///
/// Every field is optional on the wire; absent claims decode to their empty
/// value so that policy checks can still run over the full document.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestObject {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_id_scheme: Option<String>,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub response_mode: String,
    #[serde(default)]
    pub response_uri: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub presentation_definition: Option<PresentationDefinition>,
}

/// What the verifier asks a wallet to present.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub input_descriptors: Vec<InputDescriptor>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub format: Option<serde_json::Value>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub format: Option<serde_json::Value>,
    #[serde(default)]
    pub constraints: Constraints,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub fields: Vec<ConstraintField>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintField {
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filter: Option<serde_json::Value>,
    #[serde(default)]
    pub optional: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DefinitionValidationError {
    #[error("presentation definition id is missing")]
    MissingId,
    #[error("presentation definition has no input descriptors")]
    NoInputDescriptors,
    #[error("input descriptor id is missing")]
    DescriptorMissingId,
    #[error("input descriptor `{0}` has no constraint fields")]
    DescriptorWithoutFields(String),
    #[error("constraint field of input descriptor `{0}` has no path")]
    FieldWithoutPath(String),
}

impl PresentationDefinition {
    /// A definition is usable once it names itself and at least one
    /// descriptor with at least one constrained path.
    pub fn validate(&self) -> Result<(), DefinitionValidationError> {
        if self.id.is_empty() {
            return Err(DefinitionValidationError::MissingId);
        }
        if self.input_descriptors.is_empty() {
            return Err(DefinitionValidationError::NoInputDescriptors);
        }
        for descriptor in &self.input_descriptors {
            if descriptor.id.is_empty() {
                return Err(DefinitionValidationError::DescriptorMissingId);
            }
            if descriptor.constraints.fields.is_empty() {
                return Err(DefinitionValidationError::DescriptorWithoutFields(
                    descriptor.id.clone(),
                ));
            }
            for field in &descriptor.constraints.fields {
                if field.path.is_empty() {
                    return Err(DefinitionValidationError::FieldWithoutPath(
                        descriptor.id.clone(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn definition() -> PresentationDefinition {
        PresentationDefinition {
            id: "definition-1".into(),
            input_descriptors: vec![InputDescriptor {
                id: "descriptor-1".into(),
                constraints: Constraints {
                    fields: vec![ConstraintField {
                        path: vec!["$.credentialSubject.given_name".into()],
                        ..Default::default()
                    }],
                },
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn complete_definition_validates() {
        assert_eq!(definition().validate(), Ok(()));
    }

    #[test]
    fn incomplete_definitions_are_rejected() {
        let mut missing_id = definition();
        missing_id.id.clear();
        assert_eq!(missing_id.validate(), Err(DefinitionValidationError::MissingId));

        let mut no_descriptors = definition();
        no_descriptors.input_descriptors.clear();
        assert_eq!(
            no_descriptors.validate(),
            Err(DefinitionValidationError::NoInputDescriptors)
        );

        let mut no_fields = definition();
        no_fields.input_descriptors[0].constraints.fields.clear();
        assert_eq!(
            no_fields.validate(),
            Err(DefinitionValidationError::DescriptorWithoutFields("descriptor-1".into()))
        );

        let mut no_path = definition();
        no_path.input_descriptors[0].constraints.fields[0].path.clear();
        assert_eq!(
            no_path.validate(),
            Err(DefinitionValidationError::FieldWithoutPath("descriptor-1".into()))
        );
    }

    #[test]
    fn request_object_decodes_with_missing_claims() {
        let object: RequestObject = serde_json::from_str(r#"{"response_mode":"direct_post"}"#).unwrap();

        assert_eq!(object.response_mode, RESPONSE_MODE_DIRECT_POST);
        assert!(object.client_id.is_empty());
        assert!(object.presentation_definition.is_none());
    }
}
