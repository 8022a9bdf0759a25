use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// W3C linked data proof presentations, the only format verification is
/// wired up for.
pub const FORMAT_LDP_VP: &str = "ldp_vp";
/// JWT credentials appear in submissions but cannot be verified yet.
pub const FORMAT_JWT_VC: &str = "jwt_vc";

/// Submission document accompanying a `vp_token`, mapping presented elements
/// back to the input descriptors of the definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationSubmission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub definition_id: String,
    #[serde(default)]
    pub descriptor_map: Vec<DescriptorEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SubmissionValidationError {
    #[error("presentation submission id is missing")]
    MissingId,
    #[error("presentation submission definition id is missing")]
    MissingDefinitionId,
    #[error("presentation submission has no descriptor map")]
    EmptyDescriptorMap,
    #[error("descriptor map entry {0} is incomplete")]
    IncompleteEntry(usize),
}

impl PresentationSubmission {
    pub fn from_descriptors(definition_id: impl Into<String>, descriptors: Vec<DescriptorEntry>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            definition_id: definition_id.into(),
            descriptor_map: descriptors,
        }
    }

    pub fn validate(&self) -> Result<(), SubmissionValidationError> {
        if self.id.is_empty() {
            return Err(SubmissionValidationError::MissingId);
        }
        if self.definition_id.is_empty() {
            return Err(SubmissionValidationError::MissingDefinitionId);
        }
        if self.descriptor_map.is_empty() {
            return Err(SubmissionValidationError::EmptyDescriptorMap);
        }
        for (index, entry) in self.descriptor_map.iter().enumerate() {
            if entry.id.is_empty() || entry.format.is_empty() || entry.path.is_empty() {
                return Err(SubmissionValidationError::IncompleteEntry(index));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn submission() -> PresentationSubmission {
        PresentationSubmission {
            id: "submission-1".into(),
            definition_id: "definition-1".into(),
            descriptor_map: vec![DescriptorEntry {
                id: "descriptor-1".into(),
                format: FORMAT_LDP_VP.into(),
                path: "$".into(),
            }],
        }
    }

    #[test]
    fn complete_submission_validates() {
        assert_eq!(submission().validate(), Ok(()));
    }

    #[test]
    fn incomplete_submissions_are_rejected() {
        let mut missing_definition = submission();
        missing_definition.definition_id.clear();
        assert_eq!(
            missing_definition.validate(),
            Err(SubmissionValidationError::MissingDefinitionId)
        );

        let mut empty_map = submission();
        empty_map.descriptor_map.clear();
        assert_eq!(empty_map.validate(), Err(SubmissionValidationError::EmptyDescriptorMap));

        let mut incomplete_entry = submission();
        incomplete_entry.descriptor_map[0].path.clear();
        assert_eq!(
            incomplete_entry.validate(),
            Err(SubmissionValidationError::IncompleteEntry(0))
        );
    }

    #[test]
    fn from_descriptors_mints_an_id() {
        let built = PresentationSubmission::from_descriptors(
            "definition-1",
            submission().descriptor_map,
        );

        assert!(!built.id.is_empty());
        assert_eq!(built.definition_id, "definition-1");
        assert_eq!(built.validate(), Ok(()));
    }
}
