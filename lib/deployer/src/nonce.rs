//! Nonce sourcing for new transactions.
use alloy::primitives::Address;

use crate::{error::Result, node::Node};

/// Returns the nonce of the next transaction sent from `sender`.
///
/// Nonces are zero-indexed and strictly sequential per sender, so the number
/// of transactions `sender` already sent is the next nonce.
///
/// No reservation is made: two deployments from the same sender racing
/// between this query and submission get the same nonce. Callers must
/// serialize deployments per sender.
///
/// # Errors
///
/// Returns [`crate::Error::NodeQuery`] if the node can't be queried.
pub async fn next_nonce<N: Node + ?Sized>(
    node: &N,
    sender: Address,
) -> Result<u64> {
    let nonce = node.transaction_count(sender).await?;
    tracing::debug!(%sender, nonce, "fetched next nonce");
    Ok(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::MockNode, Error};

    #[tokio::test]
    async fn transaction_count_is_next_nonce() {
        let node = MockNode { transaction_count: 5, ..MockNode::default() };
        let nonce = next_nonce(&node, Address::ZERO).await.unwrap();
        assert_eq!(nonce, 5);
    }

    #[tokio::test]
    async fn node_failure_surfaces() {
        let node = MockNode { fail_transaction_count: true, ..MockNode::default() };
        let err = next_nonce(&node, Address::ZERO).await.unwrap_err();
        assert!(matches!(
            err,
            Error::NodeQuery { query: "eth_getTransactionCount", .. }
        ));
    }
}
