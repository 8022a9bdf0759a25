pub mod events;
pub mod messaging_client;
