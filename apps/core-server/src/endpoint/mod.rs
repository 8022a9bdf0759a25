pub mod misc;
pub mod presentation;
pub mod proof;
