//! Submission of signed transactions and confirmation tracking.
//!
//! A node returns a transaction's hash as soon as it accepts it into its
//! pending pool. Whether the transaction is mined is only learned by asking
//! for its receipt, which [`wait_for_receipt`] does once per new block.
use alloy::{primitives::TxHash, rpc::types::TransactionReceipt};

use crate::{
    error::{Error, Result},
    node::{BlockSubscription, Node},
    transaction::SignedTransaction,
};

/// Number of blocks observed without a receipt before giving up.
pub const DEFAULT_MAX_BLOCKS: u64 = 50;

/// State of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State<R> {
    /// Submitted, no receipt yet.
    Pending,
    /// Included in a block.
    Confirmed(R),
    /// The block budget ran out without a receipt.
    TimedOut,
}

impl<R> State<R> {
    /// Whether no further blocks need to be observed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Counts observed blocks and decides when to stop waiting for a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tracker {
    observed: u64,
    max_blocks: u64,
}

impl Tracker {
    /// Creates a tracker giving up after `max_blocks` blocks.
    #[must_use]
    pub const fn new(max_blocks: u64) -> Self {
        Self { observed: 0, max_blocks }
    }

    /// Number of blocks observed so far.
    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    /// Records a new block and the receipt lookup made for it.
    ///
    /// A receipt always wins, even on the last block of the budget. Callers
    /// stop at the first terminal state.
    pub fn on_block<R>(&mut self, receipt: Option<R>) -> State<R> {
        self.observed += 1;
        match receipt {
            Some(receipt) => State::Confirmed(receipt),
            None if self.observed >= self.max_blocks => State::TimedOut,
            None => State::Pending,
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCKS)
    }
}

/// Submits `tx` to `node` and returns its hash.
///
/// # Errors
///
/// Returns [`Error::NodeQuery`] if the node rejects the transaction.
pub async fn submit<N: Node + ?Sized>(
    node: &N,
    tx: &SignedTransaction,
) -> Result<TxHash> {
    let tx_hash = node.send_raw_transaction(&tx.encoded()).await?;
    if tx_hash != tx.hash() {
        tracing::warn!(
            %tx_hash,
            expected = %tx.hash(),
            "node reported an unexpected transaction hash"
        );
    }
    tracing::debug!(%tx_hash, "transaction submitted");
    Ok(tx_hash)
}

/// Waits until the transaction `tx_hash` is mined.
///
/// Looks the receipt up on every new block, and gives up after `max_blocks`
/// blocks. The block subscription is released whatever the outcome.
///
/// # Errors
///
/// - [`Error::ConfirmationTimeout`] if no receipt was found in `max_blocks`
///   blocks. The transaction may still be mined later.
/// - [`Error::NodeQuery`] if subscribing, polling for blocks or looking the
///   receipt up fails. No retry is made.
pub async fn wait_for_receipt<N: Node + ?Sized>(
    node: &N,
    tx_hash: TxHash,
    max_blocks: u64,
) -> Result<TransactionReceipt> {
    let mut subscription = node.subscribe_blocks().await?;
    let outcome =
        watch(node, &mut subscription, tx_hash, Tracker::new(max_blocks)).await;

    if let Err(error) = subscription.unsubscribe().await {
        tracing::warn!(%tx_hash, %error, "failed to unsubscribe from new blocks");
    }

    outcome
}

async fn watch<N: Node + ?Sized>(
    node: &N,
    subscription: &mut Box<dyn BlockSubscription>,
    tx_hash: TxHash,
    mut tracker: Tracker,
) -> Result<TransactionReceipt> {
    loop {
        let Some(block) = subscription.next_block().await? else {
            return Err(Error::node(
                "new block subscription",
                "subscription closed by the node",
            ));
        };

        let receipt = node.transaction_receipt(tx_hash).await?;
        match tracker.on_block(receipt) {
            State::Pending => {
                tracing::trace!(
                    %tx_hash,
                    %block,
                    blocks = tracker.observed(),
                    "transaction still pending"
                );
            }
            State::Confirmed(receipt) => {
                tracing::debug!(
                    %tx_hash,
                    blocks = tracker.observed(),
                    "transaction mined"
                );
                return Ok(receipt);
            }
            State::TimedOut => {
                return Err(Error::ConfirmationTimeout {
                    tx_hash,
                    blocks: tracker.observed(),
                });
            }
        }
    }
}
