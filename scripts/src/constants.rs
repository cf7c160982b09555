//! Constants used in the deploy scripts

/// The build-output directory produced by the Hardhat toolchain,
/// relative to the artifacts root
pub const HARDHAT_ARTIFACTS_DIR: &str = "artifacts";

/// The subdirectory of the Hardhat build output mirroring the
/// project's Solidity sources directory
pub const HARDHAT_SOURCES_DIR: &str = "src";

/// The build-output directory produced by the Foundry toolchain,
/// relative to the artifacts root
pub const FOUNDRY_OUT_DIR: &str = "out";

/// The name of the event emitter implementation contract
pub const EVENT_EMITTER_CONTRACT: &str = "VaultEventEmitter";

/// The name of the ERC1967 proxy contract fronting the event emitter
pub const PROXY_CONTRACT: &str = "ERC1967Proxy";

/// The name of the strategy contract
pub const STRATEGY_CONTRACT: &str = "Strategy";

/// The logical name reported for the factory-deployed vault
pub const VAULT_CONTRACT: &str = "Vault";

/// The logical name reported for the factory-deployed accountant
pub const ACCOUNTANT_CONTRACT: &str = "Accountant";

/// The role bitmask granted to the deployer for the duration of the
/// vault configuration sequence
pub const DEPLOYER_ROLES: u64 = 16383;

/// The role bitmask granted to the vault keeper
pub const KEEPER_ROLES: u64 = 112;

/// The role bitmask granted to the strategy adder
pub const STRATEGY_ADDER_ROLES: u64 = 193;

/// The empty role bitmask, used to revoke the deployer's roles
pub const NO_ROLES: u64 = 0;

/// The number of seconds to await a transaction's confirmation before
/// the pipeline fails
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 180;

/// The status value with which the verification service reports success
pub const VERIFIED_STATUS: &str = "1";

/// The marker with which the verification service rejects a contract
/// that is already verified; treated as success
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";
