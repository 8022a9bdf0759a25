pub mod presentation;
pub mod proof;
pub mod request_object;
pub mod submission;
