//! Contract creation transactions.
use alloy::{
    consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    primitives::{Address, Bytes, ChainId, Signature, TxHash, TxKind, U256},
};

use crate::{
    account::KeyPair,
    error::{Error, Result},
};

/// An unsigned contract creation transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTransaction {
    /// Sequence number of the transaction for its sender.
    pub nonce: u64,
    /// Price per unit of gas, in wei.
    pub gas_price: u128,
    /// Maximum amount of gas the creation may use.
    pub gas_limit: u64,
    /// Chain id for replay protection; `None` signs a pre-EIP-155
    /// transaction valid on any chain.
    pub chain_id: Option<ChainId>,
    /// Contract bytecode followed by the encoded constructor arguments.
    pub data: Bytes,
}

impl RawTransaction {
    /// Creates a contract creation transaction without replay protection.
    #[must_use]
    pub fn new(nonce: u64, gas_price: u128, gas_limit: u64, data: Bytes) -> Self {
        Self { nonce, gas_price, gas_limit, chain_id: None, data }
    }

    /// Binds the transaction to the chain `chain_id`.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Signs the transaction on behalf of `key_pair`.
    ///
    /// Signatures are deterministic (RFC 6979): the same key and transaction
    /// always produce the same signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if signing fails.
    pub fn sign(self, key_pair: &KeyPair) -> Result<SignedTransaction> {
        let tx = TxLegacy {
            chain_id: self.chain_id,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Create,
            value: U256::ZERO,
            input: self.data,
        };
        let signature = key_pair.sign_hash(&tx.signature_hash())?;
        Ok(SignedTransaction { inner: tx.into_signed(signature) })
    }
}

/// A signed contract creation transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    inner: Signed<TxLegacy>,
}

impl SignedTransaction {
    /// Hash the transaction will be known by once submitted.
    #[must_use]
    pub fn hash(&self) -> TxHash {
        *self.inner.hash()
    }

    /// The transaction's signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    /// The signed transaction fields.
    #[must_use]
    pub fn tx(&self) -> &TxLegacy {
        self.inner.tx()
    }

    /// Recovers the address that signed the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the signature doesn't recover.
    pub fn sender(&self) -> Result<Address> {
        self.signature()
            .recover_address_from_prehash(&self.inner.tx().signature_hash())
            .map_err(|e| Error::Encoding(format!("invalid signature: {e}")))
    }

    /// The canonical RLP wire encoding accepted by `eth_sendRawTransaction`.
    ///
    /// Integers are encoded big-endian with no leading zero bytes.
    #[must_use]
    pub fn encoded(&self) -> Bytes {
        TxEnvelope::from(self.inner.clone()).encoded_2718().into()
    }
}

/// Parses a non-negative decimal or `0x`-prefixed hexadecimal quantity.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if `s` is negative or not a number.
pub fn parse_quantity(s: &str) -> Result<u128> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err(Error::Encoding(format!("quantity must not be negative: {s}")));
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => s.parse::<u128>(),
    };
    parsed.map_err(|e| Error::Encoding(format!("invalid quantity `{s}`: {e}")))
}

#[cfg(test)]
mod tests {
    use alloy::{
        eips::eip2718::Decodable2718,
        primitives::{address, bytes},
    };
    use proptest::prelude::*;

    use super::*;
    use crate::test_utils::DEV_PRIVATE_KEY;

    fn key_pair() -> KeyPair {
        DEV_PRIVATE_KEY.parse().unwrap()
    }

    fn decode(encoded: &[u8]) -> Signed<TxLegacy> {
        let envelope = TxEnvelope::decode_2718(&mut &encoded[..]).unwrap();
        envelope.as_legacy().expect("legacy transaction").clone()
    }

    #[test]
    fn nonce_five_is_encoded_minimally() {
        let signed = RawTransaction::new(5, 1, 21_000, bytes!("6080"))
            .sign(&key_pair())
            .unwrap();

        let decoded = decode(&signed.encoded());
        assert_eq!(decoded.tx().nonce, 5);
        assert_eq!(format!("{:#x}", decoded.tx().nonce), "0x5");

        // Two-byte RLP list header, then the nonce as a single byte.
        let encoded = signed.encoded();
        assert_eq!(encoded[2], 0x05);
    }

    #[test]
    fn zero_nonce_is_empty_string() {
        let signed = RawTransaction::new(0, 1, 21_000, Bytes::new())
            .sign(&key_pair())
            .unwrap();

        // Zero encodes as the empty RLP string.
        assert_eq!(signed.encoded()[2], 0x80);
    }

    #[test]
    fn creation_has_no_recipient() {
        let signed = RawTransaction::new(1, 2, 3, bytes!("60806040"))
            .sign(&key_pair())
            .unwrap();

        let decoded = decode(&signed.encoded());
        assert_eq!(decoded.tx().to, TxKind::Create);
        assert_eq!(decoded.tx().value, U256::ZERO);
        assert_eq!(decoded.tx().input, bytes!("60806040"));
        assert_eq!(decoded.tx().gas_price, 2);
        assert_eq!(decoded.tx().gas_limit, 3);
        assert_eq!(*decoded.hash(), signed.hash());
    }

    #[test]
    fn chain_id_is_signed_over() {
        let unprotected = RawTransaction::new(0, 1, 21_000, Bytes::new())
            .sign(&key_pair())
            .unwrap();
        let protected = RawTransaction::new(0, 1, 21_000, Bytes::new())
            .with_chain_id(1337)
            .sign(&key_pair())
            .unwrap();

        assert_ne!(unprotected.hash(), protected.hash());
        assert_eq!(decode(&protected.encoded()).tx().chain_id, Some(1337));
        assert_eq!(decode(&unprotected.encoded()).tx().chain_id, None);
        assert_eq!(protected.sender().unwrap(), key_pair().address());
    }

    #[test]
    fn signature_recovers_sender() {
        let signed = RawTransaction::new(7, 1_000_000_000, 3_000_000, bytes!("00"))
            .sign(&key_pair())
            .unwrap();

        assert_eq!(
            signed.sender().unwrap(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn parses_quantities() {
        assert_eq!(parse_quantity("21000").unwrap(), 21_000);
        assert_eq!(parse_quantity("0x5208").unwrap(), 21_000);
        assert_eq!(parse_quantity(" 0 ").unwrap(), 0);
        assert!(matches!(parse_quantity("-1"), Err(Error::Encoding(_))));
        assert!(matches!(parse_quantity("ten"), Err(Error::Encoding(_))));
        assert!(matches!(parse_quantity(""), Err(Error::Encoding(_))));
    }

    proptest! {
        #[test]
        fn signing_is_deterministic(
            nonce: u64,
            gas_price: u128,
            gas_limit: u64,
            data: Vec<u8>,
        ) {
            let key_pair = key_pair();
            let tx = RawTransaction::new(nonce, gas_price, gas_limit, data.into());

            let first = tx.clone().sign(&key_pair).unwrap();
            let second = tx.sign(&key_pair).unwrap();

            prop_assert_eq!(first.encoded(), second.encoded());
            prop_assert_eq!(first.sender().unwrap(), key_pair.address());

            let decoded = decode(&first.encoded());
            prop_assert_eq!(decoded.tx().nonce, nonce);
            prop_assert_eq!(decoded.tx().gas_price, gas_price);
            prop_assert_eq!(decoded.tx().gas_limit, gas_limit);
            prop_assert_eq!(&decoded.tx().input, &first.tx().input);
        }
    }
}
