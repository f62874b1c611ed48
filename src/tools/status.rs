use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::civic::{CivicApiClient, VerificationScope};
use crate::error::{CivicError, Result};
use crate::http::Payload;
use crate::networks::{ChainId, NetworkDescriptor, NetworkKey, NetworkRegistry};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub wallet_address: String,
    pub network: String,
    #[serde(default)]
    pub scope: VerificationScope,
    #[serde(default)]
    pub gatekeeper_network: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub wallet: String,
    pub network: String,
    pub chain_id: ChainId,
    pub scope: VerificationScope,
    pub gatekeeper_network: String,
    pub pass_status: Payload,
    pub explorer_url: String,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub wallet_addresses: Vec<String>,
    pub network: String,
    #[serde(default)]
    pub scope: VerificationScope,
}

/// Outcome for one wallet of a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub wallet: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_status: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_wallets: usize,
    pub successful_checks: usize,
    pub failed_checks: usize,
    pub network: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_results: Vec<BatchItem>,
    pub summary: BatchSummary,
    pub batched_at: DateTime<Utc>,
}

/// Pass status checks, single and batched.
pub struct StatusTool {
    client: Arc<CivicApiClient>,
    registry: NetworkRegistry,
}

impl StatusTool {
    pub fn new(client: Arc<CivicApiClient>) -> Self {
        StatusTool {
            client,
            registry: NetworkRegistry::new(),
        }
    }

    /// Check one wallet. The address format is checked before any request is made.
    pub async fn check_pass_status(&self, request: StatusRequest) -> Result<StatusResponse> {
        let (network, descriptor) = self.registry.resolve(&request.network)?;

        if !validation::is_valid_wallet_address(&request.wallet_address, descriptor) {
            return Err(CivicError::InvalidAddress(network.to_string()));
        }

        let gatekeeper_override = request.gatekeeper_network.as_deref();
        let pass_status = self
            .client
            .check_pass_status(
                &request.wallet_address,
                network,
                Some(request.scope),
                gatekeeper_override,
            )
            .await?;

        Ok(StatusResponse {
            network: descriptor.name.to_string(),
            chain_id: descriptor.chain_id,
            scope: request.scope,
            gatekeeper_network: self.client.gatekeeper_network(gatekeeper_override).to_string(),
            pass_status,
            explorer_url: descriptor.explorer_address_url(&request.wallet_address),
            checked_at: Utc::now(),
            wallet: request.wallet_address,
        })
    }

    /// Check many wallets concurrently. A failing wallet is recorded, never fatal to the batch.
    pub async fn batch_check(&self, request: BatchRequest) -> Result<BatchResponse> {
        let (network, descriptor) = self.registry.resolve(&request.network)?;

        info!(
            "Batch checking {} wallets on {}",
            request.wallet_addresses.len(),
            network
        );

        let checks = request
            .wallet_addresses
            .iter()
            .map(|wallet| self.check_one(wallet, network, descriptor, request.scope));

        // join_all yields results in input order regardless of completion order
        let batch_results = join_all(checks).await;

        let successful_checks = batch_results.iter().filter(|r| r.success).count();
        let summary = BatchSummary {
            total_wallets: request.wallet_addresses.len(),
            successful_checks,
            failed_checks: batch_results.len() - successful_checks,
            network: descriptor.name.to_string(),
        };
        debug!(
            "Batch finished: {} ok, {} failed",
            summary.successful_checks, summary.failed_checks
        );

        Ok(BatchResponse {
            batch_results,
            summary,
            batched_at: Utc::now(),
        })
    }

    async fn check_one(
        &self,
        wallet: &str,
        network: NetworkKey,
        descriptor: &NetworkDescriptor,
        scope: VerificationScope,
    ) -> BatchItem {
        let outcome = if validation::is_valid_wallet_address(wallet, descriptor) {
            self.client
                .check_pass_status(wallet, network, Some(scope), None)
                .await
        } else {
            Err(CivicError::InvalidAddress(network.to_string()))
        };

        match outcome {
            Ok(pass_status) => BatchItem {
                wallet: wallet.to_string(),
                success: true,
                pass_status: Some(pass_status),
                error: None,
            },
            Err(e) => BatchItem {
                wallet: wallet.to_string(),
                success: false,
                pass_status: None,
                error: Some(e.to_string()),
            },
        }
    }
}
