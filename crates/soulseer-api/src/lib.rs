// soulseer-api: Async Rust client for the SoulSeer marketplace REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod messages;
pub mod models;
pub mod products;
pub mod request;
pub mod stripe;
pub mod transport;

pub use auth::AUTH_HEADER;
pub use client::{ApiClient, decode, decode_data};
pub use error::Error;
pub use request::{ApiRequest, Method};
pub use transport::{TlsMode, TransportConfig};
