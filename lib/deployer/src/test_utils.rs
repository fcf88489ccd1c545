//! Unit-testing utilities for the deployer.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use alloy::{
    primitives::{Address, Bytes, TxHash, B256},
    rpc::types::TransactionReceipt,
};
use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    node::{BlockSubscription, Node},
};

/// First development account of local test nodes.
pub(crate) const DEV_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Builds a receipt for `tx_hash` mined in block `block`.
pub(crate) fn receipt(tx_hash: TxHash, block: u64) -> TransactionReceipt {
    serde_json::from_value(serde_json::json!({
        "type": "0x0",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::with_last_byte(block as u8),
        "blockNumber": format!("{block:#x}"),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x1",
        "from": Address::ZERO,
        "to": null,
        "contractAddress": Address::with_last_byte(0xc0),
    }))
    .expect("receipt fixture should deserialize")
}

/// In-memory node.
///
/// Produces a new block every time the block subscription is polled and
/// mines submitted transactions on the `mined_at_block`-th receipt query.
#[derive(Default)]
pub(crate) struct MockNode {
    pub(crate) gas_price: u128,
    pub(crate) chain_id: u64,
    pub(crate) transaction_count: u64,
    /// Receipt query (1-indexed) answered with a receipt.
    pub(crate) mined_at_block: Option<u64>,
    /// Receipt query (1-indexed) answered with an error.
    pub(crate) fail_receipt_at: Option<u64>,
    /// Number of blocks after which the subscription closes.
    pub(crate) blocks_available: Option<u64>,
    pub(crate) fail_gas_price: bool,
    pub(crate) fail_transaction_count: bool,
    pub(crate) fail_submission: bool,
    pub(crate) fail_subscription: bool,
    pub(crate) fail_unsubscribe: bool,
    /// Every transaction submitted, encoded.
    pub(crate) submitted: Mutex<Vec<Bytes>>,
    pub(crate) receipt_queries: AtomicU64,
    pub(crate) subscriptions: AtomicU64,
    pub(crate) unsubscriptions: Arc<AtomicU64>,
}

impl MockNode {
    /// Encoded transactions submitted so far.
    pub(crate) fn submitted(&self) -> Vec<Bytes> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn unsubscriptions(&self) -> u64 {
        self.unsubscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Node for MockNode {
    async fn gas_price(&self) -> Result<u128> {
        if self.fail_gas_price {
            return Err(Error::node("eth_gasPrice", "connection refused"));
        }
        Ok(self.gas_price)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64> {
        if self.fail_transaction_count {
            return Err(Error::node(
                "eth_getTransactionCount",
                "connection refused",
            ));
        }
        Ok(self.transaction_count)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash> {
        if self.fail_submission {
            return Err(Error::node(
                "eth_sendRawTransaction",
                "nonce too low",
            ));
        }
        self.submitted.lock().unwrap().push(Bytes::copy_from_slice(encoded));
        Ok(alloy::primitives::keccak256(encoded))
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>> {
        let query = self.receipt_queries.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_receipt_at == Some(query) {
            return Err(Error::node(
                "eth_getTransactionReceipt",
                "connection reset",
            ));
        }
        Ok(self
            .mined_at_block
            .filter(|&block| query >= block)
            .map(|block| receipt(hash, block)))
    }

    async fn subscribe_blocks(&self) -> Result<Box<dyn BlockSubscription>> {
        if self.fail_subscription {
            return Err(Error::node("eth_newBlockFilter", "not supported"));
        }
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSubscription {
            produced: 0,
            available: self.blocks_available,
            fail_unsubscribe: self.fail_unsubscribe,
            unsubscriptions: Arc::clone(&self.unsubscriptions),
        }))
    }
}

struct MockSubscription {
    produced: u64,
    available: Option<u64>,
    fail_unsubscribe: bool,
    unsubscriptions: Arc<AtomicU64>,
}

#[async_trait]
impl BlockSubscription for MockSubscription {
    async fn next_block(&mut self) -> Result<Option<B256>> {
        if self.available.is_some_and(|available| self.produced >= available)
        {
            return Ok(None);
        }
        self.produced += 1;
        Ok(Some(B256::from(alloy::primitives::U256::from(self.produced))))
    }

    async fn unsubscribe(&mut self) -> Result<()> {
        self.unsubscriptions.fetch_add(1, Ordering::SeqCst);
        if self.fail_unsubscribe {
            return Err(Error::node("eth_uninstallFilter", "filter not found"));
        }
        Ok(())
    }
}
