use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::networks::NetworkRegistry;
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub wallet_address: String,
    pub network: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub format: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub wallet_address: String,
    pub network: String,
    pub is_valid: bool,
    pub expected_format: &'static str,
    pub actual_length: usize,
    pub validation: ValidationOutcome,
    pub validated_at: DateTime<Utc>,
}

/// Offline address format check.
#[derive(Debug, Default)]
pub struct AddressTool {
    registry: NetworkRegistry,
}

impl AddressTool {
    pub fn new() -> Self {
        AddressTool {
            registry: NetworkRegistry::new(),
        }
    }

    pub fn validate(&self, request: ValidateRequest) -> Result<ValidateResponse> {
        let (_, descriptor) = self.registry.resolve(&request.network)?;

        let is_valid = validation::is_valid_wallet_address(&request.wallet_address, descriptor);
        let reason = if is_valid {
            "Address format is correct".to_string()
        } else {
            format!(
                "Address doesn't match expected format for {}",
                descriptor.name
            )
        };

        Ok(ValidateResponse {
            actual_length: request.wallet_address.chars().count(),
            wallet_address: request.wallet_address,
            network: descriptor.name.to_string(),
            is_valid,
            expected_format: validation::expected_format(descriptor.civic_chain),
            validation: ValidationOutcome {
                format: if is_valid { "VALID" } else { "INVALID" },
                reason,
            },
            validated_at: Utc::now(),
        })
    }
}
