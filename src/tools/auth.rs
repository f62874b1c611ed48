use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::civic::{CivicApiClient, Environment};
use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub environment: Environment,
}

/// Token metadata. The token itself stays inside the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToolResponse {
    pub success: bool,
    pub environment: Environment,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    pub authenticated_at: DateTime<Utc>,
}

pub struct AuthTool {
    client: Arc<CivicApiClient>,
}

impl AuthTool {
    pub fn new(client: Arc<CivicApiClient>) -> Self {
        AuthTool { client }
    }

    pub async fn authenticate(&self, request: AuthRequest) -> Result<AuthToolResponse> {
        let auth = self.client.authenticate(request.environment).await?;

        Ok(AuthToolResponse {
            success: true,
            environment: request.environment,
            token_type: auth.token_type,
            expires_in: auth.expires_in,
            scope: auth.scope,
            authenticated_at: Utc::now(),
        })
    }
}
