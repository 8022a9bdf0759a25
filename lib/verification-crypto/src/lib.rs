//! Capability token signing and shared randomness helpers.

pub mod capability;
pub mod utilities;

pub use capability::{CapabilityKeyError, sign_id, verify_id};
