//! Best-effort source verification of deployed contracts
//!
//! Verification is cosmetic relative to the on-chain deployment having
//! succeeded: every failure path here logs and returns, never aborting the
//! pipeline or changing the process exit code

use alloy::primitives::Address;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    constants::{ALREADY_VERIFIED_MARKER, VERIFIED_STATUS},
    errors::ScriptError,
};

/// The verification service's response envelope
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    /// The service's status code; `"1"` reports success
    status: String,
    /// Human-readable detail, e.g. a rejection reason
    result: String,
}

/// The classification of a verification response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerificationOutcome {
    /// The service accepted the submission
    Verified,
    /// The contract was already verified; the desired end state holds,
    /// so this is a success
    AlreadyVerified,
    /// The service rejected the submission
    Rejected,
}

/// Classify a verification response
fn classify(response: &VerifyResponse) -> VerificationOutcome {
    if response.status == VERIFIED_STATUS {
        VerificationOutcome::Verified
    } else if response
        .result
        .to_lowercase()
        .contains(ALREADY_VERIFIED_MARKER)
    {
        VerificationOutcome::AlreadyVerified
    } else {
        VerificationOutcome::Rejected
    }
}

/// A best-effort client for an Etherscan-style source verification service
pub struct ContractVerifier {
    /// The configured endpoint, or `None` to skip verification entirely
    endpoint: Option<VerifierEndpoint>,
}

/// A configured verification endpoint
struct VerifierEndpoint {
    /// The HTTP client
    client: Client,
    /// The service URL
    url: Url,
    /// The service API key
    api_key: String,
}

impl ContractVerifier {
    /// Build a verifier from the optional service configuration
    ///
    /// Without an endpoint every verification step is skipped with a log
    /// line; supplying only one of the URL / API key pair is a
    /// configuration error
    pub fn from_config(url: Option<&str>, api_key: Option<&str>) -> Result<Self, ScriptError> {
        let endpoint = match (url, api_key) {
            (Some(url), Some(api_key)) => Some(VerifierEndpoint {
                client: Client::new(),
                url: Url::parse(url).map_err(|e| {
                    ScriptError::Configuration(format!("invalid verifier url: {e}"))
                })?,
                api_key: api_key.to_string(),
            }),
            (None, None) => None,
            _ => {
                return Err(ScriptError::Configuration(
                    "VERIFIER_URL and VERIFIER_API_KEY must be supplied together".to_string(),
                ))
            }
        };

        Ok(Self { endpoint })
    }

    /// Submit a contract for verification and log the outcome
    ///
    /// Idempotent from the pipeline's point of view: an "already verified"
    /// rejection counts as success, and any other failure is logged with
    /// its full context and swallowed
    pub async fn verify(&self, contract: &str, address: Address, constructor_args: &[u8]) {
        let Some(endpoint) = &self.endpoint else {
            info!("no verifier configured, skipping verification of {contract}");
            return;
        };

        match endpoint.submit(contract, address, constructor_args).await {
            Ok(response) => match classify(&response) {
                VerificationOutcome::Verified => {
                    info!("verified {contract} at {address:#x}")
                }
                VerificationOutcome::AlreadyVerified => {
                    info!("{contract} at {address:#x} is already verified")
                }
                VerificationOutcome::Rejected => warn!(
                    "verification of {contract} at {address:#x} rejected \
                     (constructor args 0x{}): {}",
                    hex::encode(constructor_args),
                    response.result,
                ),
            },
            Err(e) => warn!(
                "verification of {contract} at {address:#x} failed \
                 (constructor args 0x{}): {e}",
                hex::encode(constructor_args),
            ),
        }
    }
}

impl VerifierEndpoint {
    /// POST the submission, returning the service's response envelope
    async fn submit(
        &self,
        contract: &str,
        address: Address,
        constructor_args: &[u8],
    ) -> Result<VerifyResponse, ScriptError> {
        // "constructorArguements" is the service's own spelling
        let form = [
            ("apikey", self.api_key.clone()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", format!("{address:#x}")),
            ("contractname", contract.to_string()),
            ("constructorArguements", hex::encode(constructor_args)),
        ];

        let response = self
            .client
            .post(self.url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_docs_in_private_items)]

    use super::*;

    #[test]
    fn test_success_status_is_verified() {
        let response = VerifyResponse {
            status: "1".to_string(),
            result: "Pass - Verified".to_string(),
        };
        assert_eq!(classify(&response), VerificationOutcome::Verified);
    }

    #[test]
    fn test_already_verified_is_success() {
        let response = VerifyResponse {
            status: "0".to_string(),
            result: "Contract source code Already Verified".to_string(),
        };
        assert_eq!(classify(&response), VerificationOutcome::AlreadyVerified);
    }

    #[test]
    fn test_other_rejections_are_failures() {
        let response = VerifyResponse {
            status: "0".to_string(),
            result: "Unable to locate ContractCode".to_string(),
        };
        assert_eq!(classify(&response), VerificationOutcome::Rejected);
    }

    #[test]
    fn test_partial_endpoint_config_is_rejected() {
        assert!(ContractVerifier::from_config(Some("https://api.example.com"), None).is_err());
        assert!(ContractVerifier::from_config(None, Some("key")).is_err());
        assert!(ContractVerifier::from_config(None, None).is_ok());
    }
}
