pub mod controller;
pub mod dto;
