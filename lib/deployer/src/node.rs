//! The node a deployer talks to.
use alloy::{
    primitives::{Address, TxHash, B256},
    rpc::types::TransactionReceipt,
};
use async_trait::async_trait;

use crate::error::Result;

/// Connection to an Ethereum-compatible node.
///
/// Every query is a single round-trip; failures are reported as
/// [`crate::Error::NodeQuery`] and never retried.
#[async_trait]
pub trait Node: Send + Sync {
    /// Current gas price, in wei.
    async fn gas_price(&self) -> Result<u128>;

    /// Chain id of the network the node is part of.
    async fn chain_id(&self) -> Result<u64>;

    /// Number of transactions sent from `address` as of the latest block.
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    /// Submits a signed, encoded transaction and returns its hash once the
    /// node accepted it into its pending pool.
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash>;

    /// Receipt of the transaction `hash`, or `None` if it isn't mined yet.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>>;

    /// Starts watching for new blocks.
    ///
    /// The returned subscription must be released with
    /// [`BlockSubscription::unsubscribe`].
    async fn subscribe_blocks(&self) -> Result<Box<dyn BlockSubscription>>;
}

/// A live subscription to the node's new blocks.
#[async_trait]
pub trait BlockSubscription: Send {
    /// Waits for the next block and returns its hash.
    ///
    /// Returns `None` once the node closed the subscription.
    async fn next_block(&mut self) -> Result<Option<B256>>;

    /// Cancels the subscription on the node.
    async fn unsubscribe(&mut self) -> Result<()>;
}

#[async_trait]
impl<N: Node + ?Sized> Node for &N {
    async fn gas_price(&self) -> Result<u128> {
        (**self).gas_price().await
    }

    async fn chain_id(&self) -> Result<u64> {
        (**self).chain_id().await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        (**self).transaction_count(address).await
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash> {
        (**self).send_raw_transaction(encoded).await
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>> {
        (**self).transaction_receipt(hash).await
    }

    async fn subscribe_blocks(&self) -> Result<Box<dyn BlockSubscription>> {
        (**self).subscribe_blocks().await
    }
}
