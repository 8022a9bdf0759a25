pub mod authorization;
pub mod error;
pub mod presentation_request;
pub mod proof;
pub mod proof_submission;

#[cfg(test)]
pub mod test_utilities;
