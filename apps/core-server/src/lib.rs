use std::net::IpAddr;

use serde::{Deserialize, Serialize};

pub mod dto;
pub mod endpoint;
pub mod router;

mod middleware;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub server_ip: Option<IpAddr>,
    pub server_port: Option<u16>,
    /// emit traces as flattened JSON lines instead of the plain formatter
    pub trace_json: Option<bool>,
    pub trace_level: Option<String>,
}
