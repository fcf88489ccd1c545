//! Errors surfaced by the deployment entry points.
use alloy::primitives::TxHash;

/// Boxed error returned by a node transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type.
///
/// A result with the deployer's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failure of a compilation or deployment step.
///
/// Errors are never retried internally; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external compiler could not be run, exited unsuccessfully, or
    /// wrote to its error stream.
    #[error("compilation failed: {0}")]
    Compile(String),

    /// The compiler's output did not have the expected layout.
    #[error("bad abi json: {0}")]
    AbiParse(String),

    /// A node query (gas price, nonce, submission, receipt, block
    /// subscription) failed.
    #[error("node query `{query}` failed: {source}")]
    NodeQuery {
        /// Name of the failed query.
        query: &'static str,
        /// The underlying transport error.
        #[source]
        source: BoxError,
    },

    /// Transaction inputs are malformed: private key, bytecode, numeric
    /// quantities or constructor arguments.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// No receipt was observed within the block budget.
    ///
    /// The transaction may still be mined later. This is an unknown outcome,
    /// not a failed deployment.
    #[error(
        "gave up waiting for transaction {tx_hash} to be mined after {blocks} blocks (outcome unknown)"
    )]
    ConfirmationTimeout {
        /// Hash of the submitted transaction.
        tx_hash: TxHash,
        /// Number of blocks observed before giving up.
        blocks: u64,
    },
}

impl Error {
    /// Wraps a transport failure of the node query `query`.
    pub fn node(query: &'static str, source: impl Into<BoxError>) -> Self {
        Self::NodeQuery { query, source: source.into() }
    }

    /// Whether the transaction may have been executed despite this error.
    ///
    /// Only a confirmation timeout leaves a submitted transaction behind.
    #[must_use]
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_error_names_query() {
        let err = Error::node("eth_gasPrice", "connection refused");
        assert_eq!(
            err.to_string(),
            "node query `eth_gasPrice` failed: connection refused"
        );
        assert!(!err.is_unknown_outcome());
    }

    #[test]
    fn timeout_is_unknown_outcome() {
        let err =
            Error::ConfirmationTimeout { tx_hash: TxHash::ZERO, blocks: 50 };
        assert!(err.is_unknown_outcome());
        assert!(err.to_string().contains("after 50 blocks"));
    }
}
