pub mod civic;
pub mod config;
pub mod error;
pub mod http;
pub mod networks;
pub mod server;
pub mod tools;
pub mod validation;

pub use civic::CivicApiClient;
pub use config::Config;
pub use error::{CivicError, Result};
pub use networks::{NetworkKey, NetworkRegistry};
pub use server::McpServer;
