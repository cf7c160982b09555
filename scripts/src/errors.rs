//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy::primitives::Address;

/// Errors that can occur during the execution of the deploy scripts
///
/// Every variant except [`Verification`](ScriptError::Verification) is fatal
/// to the pipeline; already-deployed contracts are left in place for the
/// operator to reuse or abandon on a re-run
#[derive(Debug)]
pub enum ScriptError {
    /// Error validating the supplied configuration
    Configuration(String),
    /// No build artifact resolves for a contract name
    ArtifactNotFound(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error fetching the nonce of the deployer
    NonceFetching(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// The underlying vault reports a different asset than the one configured
    AssetMismatch {
        /// The asset address supplied in the configuration
        configured: Address,
        /// The asset address the underlying vault reports
        reported: Address,
    },
    /// A factory call's receipt lacks the expected creation event
    DeploymentEventMissing(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A submitted transaction reverted
    TransactionFailure(String),
    /// A transaction receipt did not arrive within the confirmation timeout
    ConfirmationTimeout(String),
    /// A source verification submission could not be completed
    ///
    /// Never propagated out of the verifier; downgraded to a warning there
    Verification(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ArtifactNotFound(s) => write!(f, "artifact not found: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NonceFetching(s) => write!(f, "error fetching nonce: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::AssetMismatch { configured, reported } => write!(
                f,
                "underlying vault asset {reported:#x} does not match configured asset {configured:#x}",
            ),
            ScriptError::DeploymentEventMissing(s) => {
                write!(f, "deployment event missing: {}", s)
            }
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionFailure(s) => write!(f, "transaction failed: {}", s),
            ScriptError::ConfirmationTimeout(s) => {
                write!(f, "timed out awaiting confirmation: {}", s)
            }
            ScriptError::Verification(s) => write!(f, "verification failed: {}", s),
        }
    }
}

impl Error for ScriptError {}
