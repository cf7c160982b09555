//! A serializing wrapper around the deployer identity
//!
//! Several pipeline phases submit transactions back-to-back without waiting
//! for each confirmation; the sequencer assigns nonces locally, in issuance
//! order, so those submissions can never race on the identity's nonce

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::Address,
    providers::{DynProvider, PendingTransactionBuilder, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{constants::CONFIRMATION_TIMEOUT_SECS, errors::ScriptError};

/// A contract call builder bound to the shared signing client
pub type SequencedCall<'a, C> = CallBuilder<&'a DynProvider, C, Ethereum>;

/// Issues all of the deployer's transactions with locally tracked,
/// monotonically increasing nonces
pub struct TxSequencer {
    /// The signing RPC client
    provider: DynProvider,
    /// The deployer address
    deployer: Address,
    /// The deployer's next unused nonce
    next_nonce: AtomicU64,
}

impl TxSequencer {
    /// Create a sequencer, fetching the deployer's current nonce once
    pub async fn new(provider: DynProvider, deployer: Address) -> Result<Self, ScriptError> {
        let nonce = provider
            .get_transaction_count(deployer)
            .await
            .map_err(|e| ScriptError::NonceFetching(e.to_string()))?;

        Ok(Self {
            provider,
            deployer,
            next_nonce: AtomicU64::new(nonce),
        })
    }

    /// The deployer address
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// The signing client the sequencer issues through
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Allocate the next nonce
    fn allocate_nonce(&self) -> u64 {
        self.next_nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Submit a contract call, assigning the next nonce
    ///
    /// Submission failures propagate; the sequencer never retries
    pub async fn issue<C: CallDecoder + Unpin>(
        &self,
        call: SequencedCall<'_, C>,
    ) -> Result<PendingTransactionBuilder<Ethereum>, ScriptError> {
        call.from(self.deployer)
            .nonce(self.allocate_nonce())
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    /// Await a pending transaction's receipt, rejecting reverted receipts
    pub async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, ScriptError> {
        let receipt = pending
            .with_timeout(Some(Duration::from_secs(CONFIRMATION_TIMEOUT_SECS)))
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ConfirmationTimeout(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::TransactionFailure(format!(
                "transaction {:#x} reverted",
                receipt.transaction_hash,
            )));
        }

        Ok(receipt)
    }

    /// Submit a contract call and wait for its confirmation
    pub async fn issue_and_confirm<C: CallDecoder + Unpin>(
        &self,
        call: SequencedCall<'_, C>,
    ) -> Result<TransactionReceipt, ScriptError> {
        let pending = self.issue(call).await?;
        self.confirm(pending).await
    }

    /// Submit a raw deployment transaction and wait for its confirmation
    pub async fn deploy(&self, code: Vec<u8>) -> Result<TransactionReceipt, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_nonce(self.allocate_nonce())
            .with_deploy_code(code);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        self.confirm(pending).await
    }
}
