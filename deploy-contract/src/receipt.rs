use alloy::{
    network::ReceiptResponse, primitives::Address,
    rpc::types::TransactionReceipt,
};
use eyre::ContextCompat;

/// Extension trait to recover the address of a deployed contract.
pub(crate) trait Ext {
    /// Returns the address of the contract created by the transaction.
    ///
    /// # Errors
    ///
    /// May fail if the transaction reverted or created no contract.
    fn address(&self) -> eyre::Result<Address>;
}

impl Ext for TransactionReceipt {
    fn address(&self) -> eyre::Result<Address> {
        if !self.status() {
            eyre::bail!(
                "deployment transaction {} reverted in block {:?}",
                self.transaction_hash,
                self.block_number
            );
        }
        self.contract_address().context("should contain contract address")
    }
}
