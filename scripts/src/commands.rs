//! Implementations of the deployment pipelines
//!
//! Both pipelines are strict linear sequences: each step is terminal on
//! failure and nothing deployed by an earlier step is rolled back. On a
//! re-run the operator supplies already-deployed addresses through the
//! configuration to skip the corresponding steps

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    primitives::{Address, U256},
    providers::DynProvider,
    sol_types::SolCall,
};
use itertools::Itertools;
use tracing::info;

use crate::{
    artifacts::{ArtifactDescriptor, ArtifactLocator},
    cli::{DeployStrategyArgs, DeployVaultArgs},
    config::{StrategyConfig, VaultConfig},
    constants::{
        ACCOUNTANT_CONTRACT, DEPLOYER_ROLES, EVENT_EMITTER_CONTRACT, KEEPER_ROLES, NO_ROLES,
        PROXY_CONTRACT, STRATEGY_ADDER_ROLES, STRATEGY_CONTRACT, VAULT_CONTRACT,
    },
    errors::ScriptError,
    sequencer::TxSequencer,
    solidity::{
        IAccountant, IAccountantFactory, IERC4626, IStrategy, IVault, IVaultEventEmitter,
        IVaultFactory,
    },
    types::{PipelineState, StrategyParams},
    verify::ContractVerifier,
};

// ---------------------
// | Strategy pipeline |
// ---------------------

/// Deploy the event emitter and strategy, then run the post-deployment
/// configuration sequence
pub async fn deploy_strategy(
    args: DeployStrategyArgs,
    client: DynProvider,
    deployer: Address,
) -> Result<(), ScriptError> {
    let config = StrategyConfig::resolve(&args)?;
    let locator = ArtifactLocator::new(&args.artifacts_root);
    let verifier =
        ContractVerifier::from_config(args.verifier_url.as_deref(), args.verifier_api_key.as_deref())?;
    let sequencer = TxSequencer::new(client.clone(), deployer).await?;
    let mut state = PipelineState::default();

    let event_emitter =
        deploy_event_emitter(&config, &sequencer, &locator, &verifier, &mut state).await?;

    // The strategy must wrap a vault that custodies the configured asset
    validate_underlying_asset(&config, &client).await?;

    let params = StrategyParams::new(&config, event_emitter, deployer);
    let artifact = locator.locate(STRATEGY_CONTRACT)?;
    let ctor_args = encode_constructor_args(
        &artifact,
        &[
            DynSolValue::String(config.name.clone()),
            DynSolValue::String(config.symbol.clone()),
            params.to_tuple(),
        ],
    )?;
    let strategy = deploy_from_artifact(&artifact, &ctor_args, &sequencer, &mut state).await?;
    state.record_contract("strategy", strategy);
    verifier.verify(STRATEGY_CONTRACT, strategy, &ctor_args).await;

    let plan = strategy_config_plan(&config);
    run_strategy_plan(&plan, event_emitter, strategy, &sequencer, &mut state).await?;

    state.report();
    Ok(())
}

/// Deploy the event emitter implementation and its initialized proxy,
/// returning the proxy address callers interact with
///
/// When a pre-existing implementation address is configured the
/// implementation deployment is skipped entirely; exactly one proxy is
/// deployed either way
async fn deploy_event_emitter(
    config: &StrategyConfig,
    sequencer: &TxSequencer,
    locator: &ArtifactLocator,
    verifier: &ContractVerifier,
    state: &mut PipelineState,
) -> Result<Address, ScriptError> {
    let implementation = match config.event_emitter_impl {
        Some(address) => {
            info!("reusing event emitter implementation at {address:#x}");
            state.record_contract("event-emitter-impl (reused)", address);
            address
        }
        None => {
            let artifact = locator.locate(EVENT_EMITTER_CONTRACT)?;
            let address = deploy_from_artifact(&artifact, &[], sequencer, state).await?;
            state.record_contract("event-emitter-impl", address);
            verifier.verify(EVENT_EMITTER_CONTRACT, address, &[]).await;
            address
        }
    };

    // The proxy is initialized by its constructor, in the same transaction
    // that creates it; an uninitialized proxy is never reachable by later
    // steps
    let init_data = IVaultEventEmitter::initializeCall {
        admin: config.admin,
        devops: config.devops,
    }
    .abi_encode();

    let artifact = locator.locate(PROXY_CONTRACT)?;
    let ctor_args = encode_constructor_args(
        &artifact,
        &[
            DynSolValue::Address(implementation),
            DynSolValue::Bytes(init_data),
        ],
    )?;
    let proxy = deploy_from_artifact(&artifact, &ctor_args, sequencer, state).await?;
    state.record_contract("event-emitter-proxy", proxy);
    verifier.verify(PROXY_CONTRACT, proxy, &ctor_args).await;

    Ok(proxy)
}

/// Query the underlying vault for its asset and require it to match the
/// configured one
async fn validate_underlying_asset(
    config: &StrategyConfig,
    client: &DynProvider,
) -> Result<(), ScriptError> {
    let vault = IERC4626::new(config.underlying_vault, client);
    let reported = vault
        .asset()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    ensure_asset_match(config.asset, reported)
}

/// Compare the configured asset against the one the underlying vault reports
///
/// Both sides are parsed 20-byte addresses, so the comparison is
/// case-insensitive by construction
fn ensure_asset_match(configured: Address, reported: Address) -> Result<(), ScriptError> {
    if configured == reported {
        Ok(())
    } else {
        Err(ScriptError::AssetMismatch { configured, reported })
    }
}

/// A single transaction of the strategy's post-deployment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
enum StrategyConfigStep {
    /// Set the profit unlocking duration
    ProfitUnlockTime(U256),
    /// Name the pending management identity
    PendingManagement(Address),
    /// Set the keeper identity
    Keeper(Address),
    /// Set the performance fee recipient
    FeeRecipient(Address),
    /// Pair the strategy with the event emitter
    PairWithEventEmitter,
    /// Set the minimum collateral ratio for one collateral token
    CollateralTokenParams {
        /// The collateral token
        token: Address,
        /// The token's minimum collateral ratio
        min_ratio: U256,
    },
    /// Name the pending governor, handing off governance
    PendingGovernor(Address),
}

impl StrategyConfigStep {
    /// An operator-facing label for the step's transaction
    fn label(&self) -> String {
        match self {
            StrategyConfigStep::ProfitUnlockTime(_) => "set profit max unlock time".to_string(),
            StrategyConfigStep::PendingManagement(_) => "set pending management".to_string(),
            StrategyConfigStep::Keeper(_) => "set keeper".to_string(),
            StrategyConfigStep::FeeRecipient(_) => "set performance fee recipient".to_string(),
            StrategyConfigStep::PairWithEventEmitter => "pair with event emitter".to_string(),
            StrategyConfigStep::CollateralTokenParams { token, .. } => {
                format!("set collateral params for {token:#x}")
            }
            StrategyConfigStep::PendingGovernor(_) => "set pending governor".to_string(),
        }
    }
}

/// Build the ordered post-deployment configuration plan for the strategy
///
/// Governance handoff stays last regardless of how many collateral pairs
/// are configured: every preceding call is only valid while the deployer
/// still holds the governor seat
fn strategy_config_plan(config: &StrategyConfig) -> Vec<StrategyConfigStep> {
    let mut plan = vec![
        StrategyConfigStep::ProfitUnlockTime(config.profit_max_unlock_time),
        StrategyConfigStep::PendingManagement(config.management),
        StrategyConfigStep::Keeper(config.keeper),
        StrategyConfigStep::FeeRecipient(config.fee_recipient),
        StrategyConfigStep::PairWithEventEmitter,
    ];

    for (token, min_ratio) in config
        .collateral_tokens
        .iter()
        .zip_eq(&config.min_collateral_ratios)
    {
        plan.push(StrategyConfigStep::CollateralTokenParams {
            token: *token,
            min_ratio: *min_ratio,
        });
    }

    plan.push(StrategyConfigStep::PendingGovernor(config.governor));
    plan
}

/// Execute the strategy configuration plan, one confirmation at a time
///
/// Several of these calls are only valid once prior state has taken
/// effect, so no two are ever in flight concurrently
async fn run_strategy_plan(
    plan: &[StrategyConfigStep],
    event_emitter: Address,
    strategy: Address,
    sequencer: &TxSequencer,
    state: &mut PipelineState,
) -> Result<(), ScriptError> {
    let strategy_contract = IStrategy::new(strategy, sequencer.provider().clone());
    let emitter = IVaultEventEmitter::new(event_emitter, sequencer.provider().clone());

    for step in plan {
        let receipt = match step {
            StrategyConfigStep::ProfitUnlockTime(duration) => {
                sequencer
                    .issue_and_confirm(strategy_contract.setProfitMaxUnlockTime(*duration))
                    .await?
            }
            StrategyConfigStep::PendingManagement(management) => {
                sequencer
                    .issue_and_confirm(strategy_contract.setPendingManagement(*management))
                    .await?
            }
            StrategyConfigStep::Keeper(keeper) => {
                sequencer
                    .issue_and_confirm(strategy_contract.setKeeper(*keeper))
                    .await?
            }
            StrategyConfigStep::FeeRecipient(recipient) => {
                sequencer
                    .issue_and_confirm(strategy_contract.setPerformanceFeeRecipient(*recipient))
                    .await?
            }
            StrategyConfigStep::PairWithEventEmitter => {
                sequencer
                    .issue_and_confirm(emitter.pairVaultContract(strategy))
                    .await?
            }
            StrategyConfigStep::CollateralTokenParams { token, min_ratio } => {
                sequencer
                    .issue_and_confirm(
                        strategy_contract.setCollateralTokenParams(*token, *min_ratio),
                    )
                    .await?
            }
            StrategyConfigStep::PendingGovernor(governor) => {
                sequencer
                    .issue_and_confirm(strategy_contract.setPendingGovernor(*governor))
                    .await?
            }
        };

        info!("{}: {:#x}", step.label(), receipt.transaction_hash);
        state.record_tx(step.label(), receipt.transaction_hash);
    }

    Ok(())
}

// ------------------
// | Vault pipeline |
// ------------------

/// Deploy a vault and accountant through their factories, then run the
/// post-deployment configuration sequence
pub async fn deploy_vault(
    args: DeployVaultArgs,
    client: DynProvider,
    deployer: Address,
) -> Result<(), ScriptError> {
    let config = VaultConfig::resolve(&args)?;
    let verifier =
        ContractVerifier::from_config(args.verifier_url.as_deref(), args.verifier_api_key.as_deref())?;
    let sequencer = TxSequencer::new(client, deployer).await?;
    let mut state = PipelineState::default();

    let vault = deploy_vault_via_factory(&config, &sequencer, deployer, &mut state).await?;
    verifier.verify(VAULT_CONTRACT, vault, &[]).await;

    let accountant = deploy_accountant_via_factory(&config, &sequencer, &mut state).await?;
    verifier.verify(ACCOUNTANT_CONTRACT, accountant, &[]).await;

    let plan = vault_config_plan(&config, deployer, vault, accountant);
    run_vault_plan(&plan, vault, accountant, &sequencer, &mut state).await?;

    state.report();
    Ok(())
}

/// Deploy a vault through the vault factory, extracting the new address
/// from the factory's creation event
async fn deploy_vault_via_factory(
    config: &VaultConfig,
    sequencer: &TxSequencer,
    deployer: Address,
    state: &mut PipelineState,
) -> Result<Address, ScriptError> {
    info!(
        "deploying vault \"{}\" ({}) for asset {:#x} via factory {:#x}, \
         profit max unlock time {}",
        config.name,
        config.symbol,
        config.asset,
        config.vault_factory,
        config.profit_max_unlock_time,
    );

    let factory = IVaultFactory::new(config.vault_factory, sequencer.provider().clone());
    let receipt = sequencer
        .issue_and_confirm(factory.deploy_new_vault(
            config.asset,
            config.name.clone(),
            config.symbol.clone(),
            deployer,
            config.profit_max_unlock_time,
        ))
        .await?;
    state.record_tx("deploy vault", receipt.transaction_hash);

    let vault = receipt
        .logs()
        .iter()
        .find_map(|log| {
            log.log_decode::<IVaultFactory::NewVault>()
                .map(|l| l.into_inner())
                .ok()
        })
        .map(|event| event.vaultAddress)
        .ok_or_else(|| {
            ScriptError::DeploymentEventMissing(
                "no NewVault event in the vault factory receipt".to_string(),
            )
        })?;

    state.record_contract("vault", vault);
    info!("deployed vault to {vault:#x}");
    Ok(vault)
}

/// Deploy an accountant through the accountant factory, extracting the new
/// address from the factory's creation event
async fn deploy_accountant_via_factory(
    config: &VaultConfig,
    sequencer: &TxSequencer,
    state: &mut PipelineState,
) -> Result<Address, ScriptError> {
    info!(
        "deploying accountant via factory {:#x}",
        config.accountant_factory
    );

    let factory = IAccountantFactory::new(config.accountant_factory, sequencer.provider().clone());
    let receipt = sequencer.issue_and_confirm(factory.newAccountant()).await?;
    state.record_tx("deploy accountant", receipt.transaction_hash);

    let accountant = receipt
        .logs()
        .iter()
        .find_map(|log| {
            log.log_decode::<IAccountantFactory::NewAccountant>()
                .map(|l| l.into_inner())
                .ok()
        })
        .map(|event| event.newAccountant)
        .ok_or_else(|| {
            ScriptError::DeploymentEventMissing(
                "no NewAccountant event in the accountant factory receipt".to_string(),
            )
        })?;

    state.record_contract("accountant", accountant);
    info!("deployed accountant to {accountant:#x}");
    Ok(accountant)
}

/// A single transaction of the vault pipeline's post-deployment
/// configuration
#[derive(Debug, Clone, PartialEq, Eq)]
enum VaultConfigStep {
    /// Grant a role bitmask on the vault
    GrantRole {
        /// The identity granted the roles
        account: Address,
        /// The role bitmask
        roles: U256,
    },
    /// Point the vault at its accountant
    SetAccountant(Address),
    /// Set the vault's deposit limit
    SetDepositLimit(U256),
    /// Enable the vault's default withdrawal queue
    UseDefaultQueue,
    /// Update the accountant's default fee configuration
    AccountantDefaultConfig {
        /// The default performance fee
        performance: U256,
        /// The default maximum fee
        max_fee: U256,
        /// The default maximum gain
        max_gain: U256,
        /// The default maximum loss
        max_loss: U256,
    },
    /// Register the vault with the accountant
    AccountantAddVault(Address),
    /// Name the accountant's future fee manager
    AccountantFutureFeeManager(Address),
    /// Set the accountant's fee recipient
    AccountantFeeRecipient(Address),
    /// Transfer the vault's role manager authority away from the deployer
    TransferRoleManager(Address),
    /// Revoke the deployer's elevated roles; always the final step
    RevokeDeployerRoles(Address),
}

impl VaultConfigStep {
    /// An operator-facing label for the step's transaction
    fn label(&self) -> String {
        match self {
            VaultConfigStep::GrantRole { account, roles } => {
                format!("grant roles {roles} to {account:#x}")
            }
            VaultConfigStep::SetAccountant(_) => "set accountant".to_string(),
            VaultConfigStep::SetDepositLimit(_) => "set deposit limit".to_string(),
            VaultConfigStep::UseDefaultQueue => "enable default queue".to_string(),
            VaultConfigStep::AccountantDefaultConfig { .. } => {
                "update accountant default config".to_string()
            }
            VaultConfigStep::AccountantAddVault(_) => "add vault to accountant".to_string(),
            VaultConfigStep::AccountantFutureFeeManager(_) => {
                "set accountant future fee manager".to_string()
            }
            VaultConfigStep::AccountantFeeRecipient(_) => {
                "set accountant fee recipient".to_string()
            }
            VaultConfigStep::TransferRoleManager(_) => "transfer role manager".to_string(),
            VaultConfigStep::RevokeDeployerRoles(_) => "revoke deployer roles".to_string(),
        }
    }
}

/// Build the ordered post-deployment configuration plan for the vault
/// pipeline
///
/// The privilege de-escalation pair stays last: every preceding call
/// requires the deployer's elevated role
fn vault_config_plan(
    config: &VaultConfig,
    deployer: Address,
    vault: Address,
    accountant: Address,
) -> Vec<VaultConfigStep> {
    vec![
        VaultConfigStep::GrantRole {
            account: deployer,
            roles: U256::from(DEPLOYER_ROLES),
        },
        VaultConfigStep::GrantRole {
            account: config.keeper,
            roles: U256::from(KEEPER_ROLES),
        },
        VaultConfigStep::SetAccountant(accountant),
        VaultConfigStep::SetDepositLimit(config.deposit_limit),
        VaultConfigStep::UseDefaultQueue,
        VaultConfigStep::GrantRole {
            account: config.strategy_adder,
            roles: U256::from(STRATEGY_ADDER_ROLES),
        },
        VaultConfigStep::AccountantDefaultConfig {
            performance: config.default_performance_fee,
            max_fee: config.default_max_fee,
            max_gain: config.default_max_gain,
            max_loss: config.default_max_loss,
        },
        VaultConfigStep::AccountantAddVault(vault),
        VaultConfigStep::AccountantFutureFeeManager(config.governance_factory),
        VaultConfigStep::AccountantFeeRecipient(config.fee_recipient),
        VaultConfigStep::TransferRoleManager(config.governance_factory),
        VaultConfigStep::RevokeDeployerRoles(deployer),
    ]
}

/// Execute the vault configuration plan, one confirmation at a time
async fn run_vault_plan(
    plan: &[VaultConfigStep],
    vault: Address,
    accountant: Address,
    sequencer: &TxSequencer,
    state: &mut PipelineState,
) -> Result<(), ScriptError> {
    let vault_contract = IVault::new(vault, sequencer.provider().clone());
    let accountant_contract = IAccountant::new(accountant, sequencer.provider().clone());

    for step in plan {
        let receipt = match step {
            VaultConfigStep::GrantRole { account, roles } => {
                sequencer
                    .issue_and_confirm(vault_contract.set_role(*account, *roles))
                    .await?
            }
            VaultConfigStep::SetAccountant(accountant) => {
                sequencer
                    .issue_and_confirm(vault_contract.set_accountant(*accountant))
                    .await?
            }
            VaultConfigStep::SetDepositLimit(limit) => {
                sequencer
                    .issue_and_confirm(vault_contract.set_deposit_limit(*limit))
                    .await?
            }
            VaultConfigStep::UseDefaultQueue => {
                sequencer
                    .issue_and_confirm(vault_contract.set_use_default_queue(true))
                    .await?
            }
            VaultConfigStep::AccountantDefaultConfig {
                performance,
                max_fee,
                max_gain,
                max_loss,
            } => {
                // Management and refund components are fixed at zero
                sequencer
                    .issue_and_confirm(accountant_contract.updateDefaultConfig(
                        U256::ZERO,
                        *performance,
                        U256::ZERO,
                        *max_fee,
                        *max_gain,
                        *max_loss,
                    ))
                    .await?
            }
            VaultConfigStep::AccountantAddVault(vault) => {
                sequencer
                    .issue_and_confirm(accountant_contract.addVault(*vault))
                    .await?
            }
            VaultConfigStep::AccountantFutureFeeManager(manager) => {
                sequencer
                    .issue_and_confirm(accountant_contract.setFutureFeeManager(*manager))
                    .await?
            }
            VaultConfigStep::AccountantFeeRecipient(recipient) => {
                sequencer
                    .issue_and_confirm(accountant_contract.setFeeRecipient(*recipient))
                    .await?
            }
            VaultConfigStep::TransferRoleManager(manager) => {
                sequencer
                    .issue_and_confirm(vault_contract.transfer_role_manager(*manager))
                    .await?
            }
            VaultConfigStep::RevokeDeployerRoles(deployer) => {
                sequencer
                    .issue_and_confirm(vault_contract.set_role(*deployer, U256::from(NO_ROLES)))
                    .await?
            }
        };

        info!("{}: {:#x}", step.label(), receipt.transaction_hash);
        state.record_tx(step.label(), receipt.transaction_hash);
    }

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// ABI-encode constructor arguments against an artifact's constructor
fn encode_constructor_args(
    artifact: &ArtifactDescriptor,
    args: &[DynSolValue],
) -> Result<Vec<u8>, ScriptError> {
    match &artifact.abi.constructor {
        Some(constructor) => constructor
            .abi_encode_input(args)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string())),
        None if args.is_empty() => Ok(Vec::new()),
        None => Err(ScriptError::CalldataConstruction(format!(
            "artifact for {} declares no constructor",
            artifact.name,
        ))),
    }
}

/// Deploy a contract from a located artifact, returning its address
async fn deploy_from_artifact(
    artifact: &ArtifactDescriptor,
    ctor_args: &[u8],
    sequencer: &TxSequencer,
    state: &mut PipelineState,
) -> Result<Address, ScriptError> {
    info!(
        "deploying {} from artifact {}",
        artifact.name,
        artifact.path.display(),
    );

    let mut code = artifact.bytecode.clone();
    code.extend_from_slice(ctor_args);

    let receipt = sequencer.deploy(code).await?;
    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "no contract address in the receipt for {}",
            artifact.name,
        ))
    })?;

    state.record_tx(format!("deploy {}", artifact.name), receipt.transaction_hash);
    info!("deployed {} to {address:#x}", artifact.name);
    Ok(address)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_docs_in_private_items)]

    use std::str::FromStr;

    use super::*;

    const ADDR_A: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const ADDR_B: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    /// A strategy config with the given number of collateral pairs
    fn strategy_config(collateral_pairs: usize) -> StrategyConfig {
        StrategyConfig {
            asset: addr(ADDR_A),
            underlying_vault: addr(ADDR_B),
            rate_adapter: addr(ADDR_A),
            controller: addr(ADDR_B),
            markup: U256::from(5u64),
            maturity_threshold: U256::from(3600u64),
            concentration_limit: U256::from(100_000u64),
            reserve_ratio: U256::from(2000u64),
            profit_max_unlock_time: U256::from(86_400u64),
            admin: addr(ADDR_A),
            devops: addr(ADDR_B),
            management: addr(ADDR_A),
            keeper: addr(ADDR_B),
            fee_recipient: addr(ADDR_A),
            governor: addr(ADDR_B),
            name: "Wrapped Yield".to_string(),
            symbol: "wYLD".to_string(),
            collateral_tokens: vec![addr(ADDR_A); collateral_pairs],
            min_collateral_ratios: vec![U256::from(100u64); collateral_pairs],
            event_emitter_impl: None,
        }
    }

    fn vault_config() -> VaultConfig {
        VaultConfig {
            vault_factory: addr(ADDR_A),
            accountant_factory: addr(ADDR_B),
            governance_factory: addr(ADDR_A),
            asset: addr(ADDR_B),
            name: "Yield Vault".to_string(),
            symbol: "yVLT".to_string(),
            profit_max_unlock_time: U256::from(86_400u64),
            keeper: addr(ADDR_A),
            strategy_adder: addr(ADDR_B),
            deposit_limit: U256::ZERO,
            default_performance_fee: U256::from(1000u64),
            default_max_fee: U256::ZERO,
            default_max_gain: U256::ZERO,
            default_max_loss: U256::ZERO,
            fee_recipient: addr(ADDR_A),
        }
    }

    #[test]
    fn test_governance_handoff_is_always_last() {
        for pairs in [0, 1, 5] {
            let config = strategy_config(pairs);
            let plan = strategy_config_plan(&config);

            assert_eq!(
                plan.last(),
                Some(&StrategyConfigStep::PendingGovernor(config.governor)),
                "governance handoff must be last with {pairs} collateral pairs",
            );
            // The handoff appears exactly once
            let handoffs = plan
                .iter()
                .filter(|s| matches!(s, StrategyConfigStep::PendingGovernor(_)))
                .count();
            assert_eq!(handoffs, 1);
        }
    }

    #[test]
    fn test_collateral_steps_follow_pairing_in_list_order() {
        let mut config = strategy_config(0);
        config.collateral_tokens = vec![addr(ADDR_A), addr(ADDR_B)];
        config.min_collateral_ratios = vec![U256::from(1u64), U256::from(2u64)];

        let plan = strategy_config_plan(&config);
        let collateral_steps: Vec<_> = plan
            .iter()
            .filter_map(|s| match s {
                StrategyConfigStep::CollateralTokenParams { token, min_ratio } => {
                    Some((*token, *min_ratio))
                }
                _ => None,
            })
            .collect();

        assert_eq!(
            collateral_steps,
            vec![
                (addr(ADDR_A), U256::from(1u64)),
                (addr(ADDR_B), U256::from(2u64)),
            ],
        );

        // Pairing with the event emitter precedes the collateral params
        let pair_idx = plan
            .iter()
            .position(|s| matches!(s, StrategyConfigStep::PairWithEventEmitter))
            .unwrap();
        let first_collateral_idx = plan
            .iter()
            .position(|s| matches!(s, StrategyConfigStep::CollateralTokenParams { .. }))
            .unwrap();
        assert!(pair_idx < first_collateral_idx);
    }

    #[test]
    fn test_privilege_deescalation_is_always_last() {
        let config = vault_config();
        let deployer = addr(ADDR_B);
        let plan = vault_config_plan(&config, deployer, addr(ADDR_A), addr(ADDR_B));

        let n = plan.len();
        assert_eq!(
            plan[n - 2],
            VaultConfigStep::TransferRoleManager(config.governance_factory),
        );
        assert_eq!(plan[n - 1], VaultConfigStep::RevokeDeployerRoles(deployer));

        // Every accountant configuration step precedes the de-escalation
        let last_accountant_idx = plan
            .iter()
            .rposition(|s| {
                matches!(
                    s,
                    VaultConfigStep::AccountantDefaultConfig { .. }
                        | VaultConfigStep::AccountantAddVault(_)
                        | VaultConfigStep::AccountantFutureFeeManager(_)
                        | VaultConfigStep::AccountantFeeRecipient(_)
                )
            })
            .unwrap();
        assert!(last_accountant_idx < n - 2);
    }

    #[test]
    fn test_vault_plan_grants_deployer_roles_first() {
        let deployer = addr(ADDR_B);
        let plan = vault_config_plan(&vault_config(), deployer, addr(ADDR_A), addr(ADDR_B));

        assert_eq!(
            plan.first(),
            Some(&VaultConfigStep::GrantRole {
                account: deployer,
                roles: U256::from(DEPLOYER_ROLES),
            }),
        );
    }

    #[test]
    fn test_asset_match_is_case_insensitive() {
        let configured = Address::from_str(&ADDR_A.to_lowercase()).unwrap();
        let reported = addr(ADDR_A);
        assert!(ensure_asset_match(configured, reported).is_ok());
    }

    #[test]
    fn test_asset_mismatch_aborts() {
        let err = ensure_asset_match(addr(ADDR_A), addr(ADDR_B)).unwrap_err();
        match err {
            ScriptError::AssetMismatch { configured, reported } => {
                assert_eq!(configured, addr(ADDR_A));
                assert_eq!(reported, addr(ADDR_B));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
