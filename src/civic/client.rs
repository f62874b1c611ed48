use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::civic::types::{AuthResponse, Environment, VerificationScope};
use crate::config::{Config, Credentials};
use crate::error::{CivicError, Result};
use crate::http::{HttpRequest, HttpTransport, Payload};
use crate::networks::NetworkKey;

/// Scope requested on every client-credentials grant.
pub const AUTH_SCOPE: &str = "read:pass write:pass";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Bearer token held by the client. Replaced wholesale on every authentication.
#[derive(Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
    environment: Environment,
}

impl AccessToken {
    fn issue(auth: &AuthResponse, environment: Environment, now: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(auth.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        AccessToken {
            token: auth.access_token.clone(),
            expires_at: now
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            environment,
        }
    }

    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Client for the Civic Pass API.
///
/// Owns the OAuth2 token and refreshes it lazily: every authenticated call
/// first checks the stored expiry and re-authenticates at most once.
pub struct CivicApiClient {
    config: Config,
    transport: HttpTransport,
    token: Mutex<Option<AccessToken>>,
}

impl CivicApiClient {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.request_timeout_ms)?;

        Ok(CivicApiClient {
            config,
            transport,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gatekeeper network used for a status check: a non-empty override, else the configured default.
    pub fn gatekeeper_network<'a>(&'a self, gatekeeper_override: Option<&'a str>) -> &'a str {
        gatekeeper_override
            .filter(|gk| !gk.is_empty())
            .unwrap_or(&self.config.gatekeeper_network)
    }

    fn credentials(&self, environment: Environment) -> Result<&Credentials> {
        let creds = match environment {
            Environment::Sandbox => &self.config.sandbox_credentials,
            Environment::Production => &self.config.production_credentials,
        };

        if !creds.is_complete() {
            return Err(CivicError::ConfigError(
                "Client ID and secret are required for authentication".to_string(),
            ));
        }
        Ok(creds)
    }

    /// Run the client-credentials grant without touching the stored token.
    async fn request_token(&self, environment: Environment) -> Result<AuthResponse> {
        let creds = self.credentials(environment)?;

        let mut form = Map::new();
        form.insert("grant_type".to_string(), Value::from("client_credentials"));
        form.insert("client_id".to_string(), Value::from(creds.client_id.as_str()));
        form.insert(
            "client_secret".to_string(),
            Value::from(creds.client_secret.as_str()),
        );
        form.insert("scope".to_string(), Value::from(AUTH_SCOPE));

        info!("Authenticating with Civic API ({})", environment);

        let response = self
            .transport
            .send(
                HttpRequest::post(&self.config.auth_url)
                    .header("Content-Type", FORM_CONTENT_TYPE)
                    .body(form),
            )
            .await?;

        let auth = match response.payload {
            Payload::Json(value) => serde_json::from_value::<AuthResponse>(value).map_err(|e| {
                CivicError::InvalidResponse(format!("Malformed token response: {}", e))
            })?,
            Payload::Text(_) => {
                return Err(CivicError::InvalidResponse(
                    "Token endpoint did not return JSON".to_string(),
                ))
            }
        };

        Ok(auth)
    }

    /// Authenticate with the OAuth2 client-credentials flow and store the token.
    pub async fn authenticate(&self, environment: Environment) -> Result<AuthResponse> {
        let mut token = self.token.lock().await;

        let auth = self.request_token(environment).await?;
        let issued = AccessToken::issue(&auth, environment, Utc::now());
        info!(
            "Authentication successful, token expires at {}",
            issued.expires_at.to_rfc3339()
        );
        *token = Some(issued);

        Ok(auth)
    }

    /// Current bearer token, re-authenticating first when it is missing or expired.
    ///
    /// The lock is held across re-authentication so concurrent callers share one refresh.
    /// The refresh reuses the environment of the last successful authentication.
    async fn ensure_authenticated(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        let now = Utc::now();

        if let Some(current) = token.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(current.token.clone());
        }

        let environment = token
            .as_ref()
            .map(|t| t.environment)
            .unwrap_or_default();
        warn!("Token expired or missing, re-authenticating ({})", environment);

        let auth = self.request_token(environment).await?;
        let issued = AccessToken::issue(&auth, environment, Utc::now());
        let bearer = issued.token.clone();
        *token = Some(issued);

        Ok(bearer)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let base = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        url::Url::parse_with_params(&base, params)
            .map(String::from)
            .map_err(|e| CivicError::ConfigError(format!("Invalid API URL: {}", e)))
    }

    async fn authorized_get(&self, url: String) -> Result<Payload> {
        let bearer = self.ensure_authenticated().await?;
        let response = self
            .transport
            .send(
                HttpRequest::get(url)
                    .header("Authorization", format!("Bearer {}", bearer))
                    .header("Accept", "application/json"),
            )
            .await?;
        Ok(response.payload)
    }

    /// Check the Civic Pass status of a wallet on a network.
    pub async fn check_pass_status(
        &self,
        wallet_address: &str,
        network: NetworkKey,
        scope: Option<VerificationScope>,
        gatekeeper_override: Option<&str>,
    ) -> Result<Payload> {
        let descriptor = network.descriptor();
        let gatekeeper_network = self.gatekeeper_network(gatekeeper_override);

        let mut params = vec![
            ("wallet", wallet_address),
            ("chain", descriptor.civic_chain.as_str()),
            ("chainNetwork", descriptor.civic_chain_network),
            ("gatekeeperNetwork", gatekeeper_network),
        ];
        if let Some(scope) = scope.filter(|s| *s != VerificationScope::All) {
            params.push(("scope", scope.as_str()));
        }
        let url = self.endpoint("/pass/status", &params)?;

        info!(
            "Checking pass status for {} on {}",
            wallet_address, descriptor.name
        );
        let status = self.authorized_get(url).await?;
        debug!("Pass status retrieved for {}", wallet_address);

        Ok(status)
    }

    /// Fetch detailed pass information for a wallet.
    pub async fn get_pass_details(
        &self,
        wallet_address: &str,
        network: NetworkKey,
        include_pii: bool,
    ) -> Result<Payload> {
        let descriptor = network.descriptor();
        let include_pii = include_pii.to_string();

        let url = self.endpoint(
            "/pass/details",
            &[
                ("wallet", wallet_address),
                ("chain", descriptor.civic_chain.as_str()),
                ("chainNetwork", descriptor.civic_chain_network),
                ("includePII", include_pii.as_str()),
            ],
        )?;

        info!("Getting pass details for {}", wallet_address);
        self.authorized_get(url).await
    }
}
