//! Compiled contracts and their creation payload.
use alloy::{hex, primitives::Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    abi::{self, AbiItem},
    error::{Error, Result},
};

/// A compiled contract, ready to be deployed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract name, when the compiler reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hex-encoded creation bytecode, with or without a `0x` prefix.
    pub code: String,
    /// The contract's JSON ABI.
    pub abi: Vec<AbiItem>,
}

impl Contract {
    /// Creates a contract from its hex-encoded bytecode and ABI.
    #[must_use]
    pub fn new(code: impl Into<String>, abi: Vec<AbiItem>) -> Self {
        Self { name: None, code: code.into(), abi }
    }

    /// Decodes the creation bytecode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the bytecode is not valid hex.
    pub fn bytecode(&self) -> Result<Bytes> {
        hex::decode(self.code.trim()).map(Bytes::from).map_err(|e| {
            Error::Encoding(format!("contract bytecode is not valid hex: {e}"))
        })
    }

    /// Returns the payload of a transaction creating this contract: the
    /// bytecode followed by the encoded constructor arguments.
    ///
    /// # Errors
    ///
    /// See [`Contract::bytecode`] and [`abi::encode_constructor_params`].
    pub fn deploy_code<S: AsRef<str>>(&self, params: &[S]) -> Result<Bytes> {
        let bytecode = self.bytecode()?;
        let args = abi::encode_constructor_params(&self.abi, params)?;
        if args.is_empty() {
            return Ok(bytecode);
        }
        let mut code = bytecode.to_vec();
        code.extend_from_slice(&args);
        Ok(code.into())
    }
}
