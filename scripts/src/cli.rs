//! Definitions of CLI arguments and commands for the deploy scripts
//!
//! Every configuration key may be supplied either as a flag or through the
//! environment; values are captured raw here and validated by the config
//! resolver before any network call is made

use alloy::{primitives::Address, providers::DynProvider};
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy_strategy, deploy_vault},
    errors::ScriptError,
};

/// Deploy and wire the vault, strategy, and event emitter contracts on an
/// EVM chain
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: String,

    /// The deployment pipeline to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deployment pipelines
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the event emitter (implementation + proxy) and the strategy,
    /// then run the post-deployment configuration sequence
    DeployStrategy(DeployStrategyArgs),
    /// Deploy a vault and accountant through their factories, then run the
    /// post-deployment configuration sequence
    DeployVault(DeployVaultArgs),
}

impl Command {
    /// Run the selected pipeline
    pub async fn run(self, client: DynProvider, deployer: Address) -> Result<(), ScriptError> {
        match self {
            Command::DeployStrategy(args) => deploy_strategy(args, client, deployer).await,
            Command::DeployVault(args) => deploy_vault(args, client, deployer).await,
        }
    }
}

/// Arguments for the strategy deployment pipeline
#[derive(Args)]
pub struct DeployStrategyArgs {
    /// Root directory under which compiled artifacts are searched
    #[arg(long, env = "ARTIFACTS_ROOT", default_value = ".")]
    pub artifacts_root: String,

    /// The strategy's underlying asset address
    #[arg(long, env = "ASSET_ADDRESS")]
    pub asset: String,

    /// The address of the yield vault the strategy wraps
    #[arg(long, env = "UNDERLYING_VAULT_ADDRESS")]
    pub underlying_vault: String,

    /// The rate adapter address
    #[arg(long, env = "RATE_ADAPTER_ADDRESS")]
    pub rate_adapter: String,

    /// The controller address
    #[arg(long, env = "CONTROLLER_ADDRESS")]
    pub controller: String,

    /// The rate markup applied by the strategy
    #[arg(long, env = "RATE_MARKUP")]
    pub markup: String,

    /// The time-to-maturity threshold
    #[arg(long, env = "TIME_TO_MATURITY_THRESHOLD")]
    pub maturity_threshold: String,

    /// The per-token concentration limit
    #[arg(long, env = "CONCENTRATION_LIMIT")]
    pub concentration_limit: String,

    /// The required reserve ratio
    #[arg(long, env = "REQUIRED_RESERVE_RATIO")]
    pub reserve_ratio: String,

    /// The profit unlocking duration, in seconds
    #[arg(long, env = "PROFIT_MAX_UNLOCK_TIME")]
    pub profit_max_unlock_time: String,

    /// The event emitter admin address
    #[arg(long, env = "ADMIN_ADDRESS")]
    pub admin: String,

    /// The event emitter devops address
    #[arg(long, env = "DEVOPS_ADDRESS")]
    pub devops: String,

    /// The address given pending management of the strategy
    #[arg(long, env = "MANAGEMENT_ADDRESS")]
    pub management: String,

    /// The keeper address
    #[arg(long, env = "KEEPER_ADDRESS")]
    pub keeper: String,

    /// The performance fee recipient address
    #[arg(long, env = "FEE_RECIPIENT")]
    pub fee_recipient: String,

    /// The address given pending governorship of the strategy
    #[arg(long, env = "GOVERNOR_ADDRESS")]
    pub governor: String,

    /// The strategy share token's "name,symbol" pair
    #[arg(long, env = "STRATEGY_NAME")]
    pub strategy_name: String,

    /// Comma-separated collateral token addresses
    #[arg(long, env = "COLLATERAL_TOKEN_ADDRESSES", default_value = "")]
    pub collateral_tokens: String,

    /// Comma-separated minimum collateral ratios, parallel to the token list
    #[arg(long, env = "MIN_COLLATERAL_RATIOS", default_value = "")]
    pub min_collateral_ratios: String,

    /// A pre-existing event emitter implementation address to reuse instead
    /// of deploying a fresh one
    #[arg(long, env = "EVENT_EMITTER_IMPL_ADDRESS")]
    pub event_emitter_impl: Option<String>,

    /// Source verification service URL; verification is skipped when unset
    #[arg(long, env = "VERIFIER_URL")]
    pub verifier_url: Option<String>,

    /// Source verification service API key
    #[arg(long, env = "VERIFIER_API_KEY")]
    pub verifier_api_key: Option<String>,
}

/// Arguments for the vault deployment pipeline
#[derive(Args)]
pub struct DeployVaultArgs {
    /// The vault factory address
    #[arg(long, env = "VAULT_FACTORY")]
    pub vault_factory: String,

    /// The accountant factory address
    #[arg(long, env = "ACCOUNTANT_FACTORY")]
    pub accountant_factory: String,

    /// The governance factory receiving the vault's role manager authority
    /// and the accountant's future fee management
    #[arg(long, env = "VAULT_GOVERNANCE_FACTORY")]
    pub governance_factory: String,

    /// The vault's underlying asset address
    #[arg(long, env = "ASSET_ADDRESS")]
    pub asset: String,

    /// The vault share token's name
    #[arg(long, env = "VAULT_NAME")]
    pub vault_name: String,

    /// The vault share token's symbol
    #[arg(long, env = "VAULT_SYMBOL")]
    pub vault_symbol: String,

    /// The profit unlocking duration, in seconds
    #[arg(long, env = "PROFIT_MAX_UNLOCK_TIME")]
    pub profit_max_unlock_time: String,

    /// The keeper address
    #[arg(long, env = "KEEPER_ADDRESS")]
    pub keeper: String,

    /// The address granted the strategy-adder role
    #[arg(long, env = "STRATEGY_ADDER")]
    pub strategy_adder: String,

    /// The vault deposit limit
    #[arg(long, env = "DEPOSIT_LIMIT", default_value = "0")]
    pub deposit_limit: String,

    /// The accountant's default performance fee
    #[arg(long, env = "DEFAULT_PERFORMANCE_FEE", default_value = "0")]
    pub default_performance_fee: String,

    /// The accountant's default maximum fee
    #[arg(long, env = "DEFAULT_MAX_FEE", default_value = "0")]
    pub default_max_fee: String,

    /// The accountant's default maximum gain
    #[arg(long, env = "DEFAULT_MAX_GAIN", default_value = "0")]
    pub default_max_gain: String,

    /// The accountant's default maximum loss
    #[arg(long, env = "DEFAULT_MAX_LOSS", default_value = "0")]
    pub default_max_loss: String,

    /// The accountant's fee recipient address
    #[arg(long, env = "FEE_RECIPIENT")]
    pub fee_recipient: String,

    /// Source verification service URL; verification is skipped when unset
    #[arg(long, env = "VERIFIER_URL")]
    pub verifier_url: Option<String>,

    /// Source verification service API key
    #[arg(long, env = "VERIFIER_API_KEY")]
    pub verifier_api_key: Option<String>,
}
