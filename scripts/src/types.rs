//! Type definitions used throughout the deploy scripts

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, TxHash, U256},
};
use tracing::info;

use crate::config::StrategyConfig;

/// A deployed or reused contract, recorded once per pipeline step
#[derive(Debug, Clone, Copy)]
pub struct DeployedContract {
    /// The logical contract name
    pub name: &'static str,
    /// The address the contract lives at
    pub address: Address,
}

/// The addresses and transactions accumulated as a pipeline advances
///
/// Append-only: later steps read earlier entries but never mutate them.
/// The full state is reported once the pipeline completes so the operator
/// can audit everything that was produced
#[derive(Default)]
pub struct PipelineState {
    /// The contracts deployed or reused so far, in pipeline order
    contracts: Vec<DeployedContract>,
    /// Every transaction issued, as (label, hash) pairs in issuance order
    transactions: Vec<(String, TxHash)>,
}

impl PipelineState {
    /// Record a deployed or reused contract
    pub fn record_contract(&mut self, name: &'static str, address: Address) -> DeployedContract {
        let handle = DeployedContract { name, address };
        self.contracts.push(handle);
        handle
    }

    /// Record an issued transaction
    pub fn record_tx(&mut self, label: impl Into<String>, hash: TxHash) {
        self.transactions.push((label.into(), hash));
    }

    /// The recorded contracts, in pipeline order
    pub fn contracts(&self) -> &[DeployedContract] {
        &self.contracts
    }

    /// Report every address and transaction the pipeline produced
    pub fn report(&self) {
        for contract in &self.contracts {
            info!("{} at {:#x}", contract.name, contract.address);
        }
        for (label, hash) in &self.transactions {
            info!("{label}: {hash:#x}");
        }
    }
}

/// The constructor parameters of the strategy contract
///
/// Assembled from the resolved configuration plus the two addresses only
/// known once the pipeline is underway: the event emitter proxy and the
/// deployer itself
#[derive(Debug, Clone)]
pub struct StrategyParams {
    /// The strategy's underlying asset
    pub asset: Address,
    /// The yield vault the strategy wraps
    pub underlying_vault: Address,
    /// The rate adapter
    pub rate_adapter: Address,
    /// The event emitter proxy
    pub event_emitter: Address,
    /// The deploying identity
    pub deployer: Address,
    /// The controller contract
    pub controller: Address,
    /// The rate markup
    pub markup: U256,
    /// The time-to-maturity threshold
    pub maturity_threshold: U256,
    /// The per-token concentration limit
    pub concentration_limit: U256,
    /// The required reserve ratio
    pub reserve_ratio: U256,
}

impl StrategyParams {
    /// Assemble the constructor parameters
    pub fn new(config: &StrategyConfig, event_emitter: Address, deployer: Address) -> Self {
        Self {
            asset: config.asset,
            underlying_vault: config.underlying_vault,
            rate_adapter: config.rate_adapter,
            event_emitter,
            deployer,
            controller: config.controller,
            markup: config.markup,
            maturity_threshold: config.maturity_threshold,
            concentration_limit: config.concentration_limit,
            reserve_ratio: config.reserve_ratio,
        }
    }

    /// The parameters as an ABI tuple, in constructor field order
    pub fn to_tuple(&self) -> DynSolValue {
        DynSolValue::Tuple(vec![
            DynSolValue::Address(self.asset),
            DynSolValue::Address(self.underlying_vault),
            DynSolValue::Address(self.rate_adapter),
            DynSolValue::Address(self.event_emitter),
            DynSolValue::Address(self.deployer),
            DynSolValue::Address(self.controller),
            DynSolValue::Uint(self.markup, 256),
            DynSolValue::Uint(self.maturity_threshold, 256),
            DynSolValue::Uint(self.concentration_limit, 256),
            DynSolValue::Uint(self.reserve_ratio, 256),
        ])
    }
}
