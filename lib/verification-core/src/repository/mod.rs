pub mod error;
pub mod presentation_repository;
