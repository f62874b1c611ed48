use crate::error::{CivicError, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.civic.com";
pub const DEFAULT_AUTH_URL: &str = "https://auth.civic.com/oauth/token";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Publicly documented Civic sandbox credentials.
pub const SANDBOX_CLIENT_ID: &str = "dtVTGsKUlkPQ8UXKqSskS1HqNI3hERHT";
pub const SANDBOX_CLIENT_SECRET: &str =
    "7DT722BjNlXUp8HVaV_ZjHzopq2Tr12doGB8sBYC-vhPo3Eh0HoidLVATFbxmwZ1";
pub const SANDBOX_GATEKEEPER_NETWORK: &str = "tgnuXXNMDLK8dy7Xm1TdeGyc95MDym4bvAQCwcW21Bf";

/// OAuth2 client credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn sandbox() -> Self {
        Credentials::new(SANDBOX_CLIENT_ID, SANDBOX_CLIENT_SECRET)
    }

    /// Both halves are present and not blank.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

// Never print the secret.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub auth_url: String,
    pub sandbox_credentials: Credentials,
    pub production_credentials: Credentials,
    pub gatekeeper_network: String,
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            sandbox_credentials: Credentials::sandbox(),
            production_credentials: Credentials::default(),
            gatekeeper_network: SANDBOX_GATEKEEPER_NETWORK.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_base_url =
            env::var("CIVIC_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let auth_url = env::var("CIVIC_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string());

        // Production credentials may be absent; authentication fails closed later.
        let production_credentials = Credentials::new(
            env::var("CIVIC_CLIENT_ID").unwrap_or_default(),
            env::var("CIVIC_CLIENT_SECRET").unwrap_or_default(),
        );

        let gatekeeper_network = env::var("CIVIC_GATEKEEPER_NETWORK")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| SANDBOX_GATEKEEPER_NETWORK.to_string());

        let request_timeout_ms = env::var("CIVIC_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                CivicError::ConfigError(format!("Invalid CIVIC_REQUEST_TIMEOUT_MS: {}", e))
            })?;

        let config = Config {
            api_base_url,
            auth_url,
            sandbox_credentials: Credentials::sandbox(),
            production_credentials,
            gatekeeper_network,
            request_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default configuration pointed at a different API host. Both the API and
    /// the token endpoint live under `base_url`.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Config {
            api_base_url: base.to_string(),
            auth_url: format!("{}/oauth/token", base),
            ..Config::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("CIVIC_API_BASE_URL", &self.api_base_url),
            ("CIVIC_AUTH_URL", &self.auth_url),
        ] {
            value
                .parse::<url::Url>()
                .map_err(|e| CivicError::ConfigError(format!("Invalid {}: {}", name, e)))?;
        }

        if self.request_timeout_ms == 0 {
            return Err(CivicError::ConfigError(
                "CIVIC_REQUEST_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
