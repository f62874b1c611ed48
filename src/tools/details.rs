use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::civic::CivicApiClient;
use crate::error::{CivicError, Result};
use crate::http::Payload;
use crate::networks::NetworkRegistry;
use crate::validation;

pub const PII_WARNING: &str = "PII data included - handle securely and ensure user consent";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    pub wallet_address: String,
    pub network: String,
    #[serde(default, rename = "includePII")]
    pub include_pii: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub wallet: String,
    pub network: String,
    #[serde(rename = "includePII")]
    pub include_pii: bool,
    pub pass_details: Payload,
    pub retrieved_at: DateTime<Utc>,
    pub warning: Option<&'static str>,
}

pub struct DetailsTool {
    client: Arc<CivicApiClient>,
    registry: NetworkRegistry,
}

impl DetailsTool {
    pub fn new(client: Arc<CivicApiClient>) -> Self {
        DetailsTool {
            client,
            registry: NetworkRegistry::new(),
        }
    }

    pub async fn get_pass_details(&self, request: DetailsRequest) -> Result<DetailsResponse> {
        let (network, descriptor) = self.registry.resolve(&request.network)?;

        if !validation::is_valid_wallet_address(&request.wallet_address, descriptor) {
            return Err(CivicError::InvalidAddress(network.to_string()));
        }

        if request.include_pii {
            warn!("PII requested for {}", request.wallet_address);
        }

        let pass_details = self
            .client
            .get_pass_details(&request.wallet_address, network, request.include_pii)
            .await?;

        Ok(DetailsResponse {
            wallet: request.wallet_address,
            network: descriptor.name.to_string(),
            include_pii: request.include_pii,
            pass_details,
            retrieved_at: Utc::now(),
            warning: request.include_pii.then_some(PII_WARNING),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    const WALLET: &str = "tgnuXXNMDLK8dy7Xm1TdeGyc95MDym4bvAQCwcW21Bf";

    async fn setup(include_pii: bool) -> (ServerGuard, mockito::Mock, mockito::Mock) {
        let mut server = Server::new_async().await;
        let auth = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#)
            .create_async()
            .await;
        let details = server
            .mock("GET", "/pass/details")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("wallet".into(), WALLET.into()),
                Matcher::UrlEncoded("chain".into(), "solana".into()),
                Matcher::UrlEncoded("includePII".into(), include_pii.to_string()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "passId": "pass-1",
                    "status": "ACTIVE",
                    "passType": "liveness",
                    "issuedAt": "2024-01-01T00:00:00Z",
                    "verificationLevel": "basic"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        (server, auth, details)
    }

    fn tool_for(server: &ServerGuard) -> DetailsTool {
        let client = CivicApiClient::new(Config::from_base_url(&server.url())).unwrap();
        DetailsTool::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_details_with_pii_carries_warning() {
        let (server, _auth, details) = setup(true).await;
        let response = tool_for(&server)
            .get_pass_details(DetailsRequest {
                wallet_address: WALLET.to_string(),
                network: "solana-devnet".to_string(),
                include_pii: true,
            })
            .await
            .unwrap();

        assert_eq!(response.network, "Solana Devnet");
        assert_eq!(response.warning, Some(PII_WARNING));
        assert_eq!(response.pass_details.as_json().unwrap()["passId"], "pass-1");

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["includePII"], true);
        details.assert_async().await;
    }

    #[tokio::test]
    async fn test_details_without_pii_has_null_warning() {
        let (server, _auth, details) = setup(false).await;
        let response = tool_for(&server)
            .get_pass_details(DetailsRequest {
                wallet_address: WALLET.to_string(),
                network: "solana-devnet".to_string(),
                include_pii: false,
            })
            .await
            .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        assert!(value["warning"].is_null());
        details.assert_async().await;
    }

    #[tokio::test]
    async fn test_details_rejects_evm_address_on_solana() {
        let server = Server::new_async().await;
        let err = tool_for(&server)
            .get_pass_details(DetailsRequest {
                wallet_address: "0x9281B31230C735867a2Fd62aF8ec816Cc1714521".to_string(),
                network: "solana-devnet".to_string(),
                include_pii: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CivicError::InvalidAddress(_)));
    }

    #[test]
    fn test_include_pii_defaults_to_false() {
        let request: DetailsRequest = serde_json::from_value(json!({
            "walletAddress": WALLET,
            "network": "solana-devnet"
        }))
        .unwrap();
        assert!(!request.include_pii);
    }
}
