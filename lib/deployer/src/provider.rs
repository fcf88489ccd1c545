//! [`Node`] implementation over an `alloy` provider.
use std::{collections::VecDeque, fmt, time::Duration};

use alloy::{
    primitives::{Address, TxHash, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
};
use async_trait::async_trait;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::{
    error::{Error, Result},
    node::{BlockSubscription, Node},
};

/// Default interval between two polls of a block filter.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A node reached through an `alloy` provider.
///
/// The connection stays open as long as this value (or a clone of it) lives.
#[derive(Clone)]
pub struct ProviderNode {
    provider: DynProvider,
    poll_interval: Duration,
}

impl ProviderNode {
    /// Wraps an already connected provider.
    pub fn new<P: Provider + 'static>(provider: P) -> Self {
        Self { provider: provider.erased(), poll_interval: DEFAULT_POLL_INTERVAL }
    }

    /// Connects to the node at `endpoint`.
    ///
    /// `endpoint` is either the path of the node's IPC socket, or a `ws://`,
    /// `wss://`, `http://` or `https://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeQuery`] if the connection can't be established.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(endpoint)
            .await
            .map_err(|e| Error::node("connect", e))?;
        tracing::debug!(endpoint, "connected to node");
        Ok(Self::new(provider))
    }

    /// Sets how often block filters are polled for new blocks.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The underlying provider.
    #[must_use]
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl fmt::Debug for ProviderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderNode")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Node for ProviderNode {
    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::node("eth_gasPrice", e))
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| Error::node("eth_chainId", e))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| Error::node("eth_getTransactionCount", e))
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(encoded)
            .await
            .map_err(|e| Error::node("eth_sendRawTransaction", e))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::node("eth_getTransactionReceipt", e))
    }

    async fn subscribe_blocks(&self) -> Result<Box<dyn BlockSubscription>> {
        let id = self
            .provider
            .new_block_filter()
            .await
            .map_err(|e| Error::node("eth_newBlockFilter", e))?;
        tracing::trace!(%id, "installed block filter");

        let mut ticks = interval(self.poll_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Box::new(BlockFilter {
            provider: self.provider.clone(),
            id,
            ticks,
            blocks: VecDeque::new(),
            installed: true,
        }))
    }
}

/// New blocks observed by polling a node-side block filter.
struct BlockFilter {
    provider: DynProvider,
    id: U256,
    ticks: Interval,
    /// Blocks returned by the last poll and not consumed yet.
    blocks: VecDeque<B256>,
    installed: bool,
}

impl Drop for BlockFilter {
    /// Uninstalls a filter that was never released, in the background.
    ///
    /// Only runs when the subscription is dropped without
    /// [`BlockSubscription::unsubscribe`], e.g. when a deployment future is
    /// cancelled. Outside a `tokio` runtime the node expires the filter.
    fn drop(&mut self) {
        if !self.installed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(id = %self.id, "dropped block filter left installed");
            return;
        };
        let provider = self.provider.clone();
        let id = self.id;
        runtime.spawn(async move {
            if let Err(error) = provider.uninstall_filter(id).await {
                tracing::debug!(%id, %error, "failed to uninstall dropped block filter");
            }
        });
    }
}

#[async_trait]
impl BlockSubscription for BlockFilter {
    async fn next_block(&mut self) -> Result<Option<B256>> {
        loop {
            if let Some(block) = self.blocks.pop_front() {
                return Ok(Some(block));
            }
            if !self.installed {
                return Ok(None);
            }

            self.ticks.tick().await;
            let changes: Vec<B256> = self
                .provider
                .get_filter_changes(self.id)
                .await
                .map_err(|e| Error::node("eth_getFilterChanges", e))?;
            self.blocks.extend(changes);
        }
    }

    async fn unsubscribe(&mut self) -> Result<()> {
        if !self.installed {
            return Ok(());
        }
        self.installed = false;
        self.blocks.clear();

        let removed = self
            .provider
            .uninstall_filter(self.id)
            .await
            .map_err(|e| Error::node("eth_uninstallFilter", e))?;
        if !removed {
            tracing::debug!(id = %self.id, "block filter already expired");
        }
        Ok(())
    }
}
