//! Public deployment entry points.
use std::path::Path;

use alloy::{primitives::ChainId, rpc::types::TransactionReceipt};

use crate::{
    account::KeyPair,
    compile::Compiler,
    confirmation::{self, DEFAULT_MAX_BLOCKS},
    contract::Contract,
    error::Result,
    node::Node,
    nonce,
    provider::ProviderNode,
    transaction::RawTransaction,
};

/// A basic smart contract deployer.
///
/// Owns the connection to the node; the connection closes when the deployer
/// is dropped.
///
/// Deployments from different senders may run concurrently. Deployments from
/// the same sender must be serialized by the caller, since each one uses the
/// sender's transaction count at the time it starts as its nonce.
#[derive(Debug)]
pub struct Deployer<N = ProviderNode> {
    node: N,
    compiler: Compiler,
    chain_id: Option<ChainId>,
    max_blocks: u64,
}

impl Deployer<ProviderNode> {
    /// Connects to the node at `endpoint` (IPC socket path, or WebSocket or
    /// HTTP URL).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeQuery`] if the connection fails.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        Ok(Self::new(ProviderNode::connect(endpoint).await?))
    }
}

impl<N: Node> Deployer<N> {
    /// Creates a deployer talking to `node`.
    pub fn new(node: N) -> Self {
        Self {
            node,
            compiler: Compiler::default(),
            chain_id: None,
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }

    /// Use `compiler` in [`Deployer::compile_contract`].
    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Sign deployments for the chain `chain_id` (EIP-155). Without it,
    /// transactions carry no replay protection.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Give up waiting for a deployment to be mined after `max_blocks` blocks.
    #[must_use]
    pub fn with_max_blocks(mut self, max_blocks: u64) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// The node this deployer talks to.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Compiles the Solidity source at `path`.
    ///
    /// # Errors
    ///
    /// See [`Compiler::compile`].
    pub async fn compile_contract(&self, path: impl AsRef<Path>) -> Result<Contract> {
        self.compiler.compile(path).await
    }

    /// Current gas price on the node, in wei.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeQuery`] if the node can't be queried.
    pub async fn current_gas_price(&self) -> Result<u128> {
        self.node.gas_price().await
    }

    /// Deploys `contract` on behalf of `key_pair`, and waits until the
    /// deployment is mined.
    ///
    /// `constructor_params` are ABI-encoded against the contract's
    /// constructor with the same number of inputs, and appended to its
    /// bytecode.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Encoding`] if the contract or its arguments can't be
    ///   encoded.
    /// - [`crate::Error::NodeQuery`] if any node query fails.
    /// - [`crate::Error::ConfirmationTimeout`] if the deployment wasn't mined
    ///   in time. It has been submitted, and may still be mined.
    pub async fn deploy_contract<S: AsRef<str>>(
        &self,
        key_pair: &KeyPair,
        contract: &Contract,
        constructor_params: &[S],
        gas_price: u128,
        gas_limit: u64,
    ) -> Result<TransactionReceipt> {
        let sender = key_pair.address();
        let nonce = nonce::next_nonce(&self.node, sender).await?;

        let data = contract.deploy_code(constructor_params)?;
        let mut tx = RawTransaction::new(nonce, gas_price, gas_limit, data);
        if let Some(chain_id) = self.chain_id {
            tx = tx.with_chain_id(chain_id);
        }
        let signed = tx.sign(key_pair)?;

        let tx_hash = confirmation::submit(&self.node, &signed).await?;
        tracing::info!(
            %tx_hash,
            %sender,
            nonce,
            gas_price,
            gas_limit,
            "contract submitted"
        );

        let receipt =
            confirmation::wait_for_receipt(&self.node, tx_hash, self.max_blocks)
                .await?;
        tracing::info!(
            %tx_hash,
            block = receipt.block_number,
            contract = ?receipt.contract_address,
            "contract mined"
        );
        Ok(receipt)
    }
}
