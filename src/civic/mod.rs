pub mod client;
pub mod types;

pub use client::CivicApiClient;
pub use types::{AuthResponse, Environment, VerificationScope};
