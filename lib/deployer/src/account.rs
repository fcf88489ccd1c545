//! Key pairs of deploying accounts.
use std::{fmt, str::FromStr};

use alloy::{
    hex,
    primitives::{Address, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

use crate::error::{Error, Result};

/// Length in bytes of a secp256k1 private key.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Key pair of the account that sends deployment transactions.
///
/// Owned by the caller. The deployer only borrows it to derive the sender
/// address and to sign, and never stores it.
#[derive(Clone)]
pub struct KeyPair {
    /// The account's local private key wrapper.
    signer: PrivateKeySigner,
}

impl KeyPair {
    /// Creates a key pair from a raw 32-byte private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if `private_key` is not a valid secp256k1
    /// scalar.
    pub fn from_bytes(private_key: &B256) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(private_key)
            .map_err(|e| Error::Encoding(format!("invalid private key: {e}")))?;
        Ok(Self { signer })
    }

    /// Creates a key pair from a fresh random private key.
    #[must_use]
    pub fn random() -> Self {
        Self { signer: PrivateKeySigner::random() }
    }

    /// Retrieve the sender address derived from this key pair.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get a hex-encoded String representing this key pair's private key.
    #[must_use]
    pub fn pk(&self) -> String {
        hex::encode(self.signer.to_bytes())
    }

    /// Sign the given prehashed message.
    pub(crate) fn sign_hash(
        &self,
        hash: &B256,
    ) -> Result<alloy::primitives::Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| Error::Encoding(format!("failed to sign: {e}")))
    }
}

impl FromStr for KeyPair {
    type Err = Error;

    /// Parses a hex-encoded private key, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| {
            Error::Encoding(format!("private key is not valid hex: {e}"))
        })?;
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(Error::Encoding(format!(
                "private key must be {PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_bytes(&B256::from_slice(&bytes))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("address", &self.address()).finish()
    }
}
