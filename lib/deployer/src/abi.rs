//! Constructor argument encoding.
//!
//! Contract creation transactions carry the constructor arguments
//! ABI-encoded and appended to the contract's bytecode.
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi,
    primitives::Bytes,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of an ABI descriptor carrying a constructor.
pub const CONSTRUCTOR: &str = "constructor";

/// A single descriptor of a contract's JSON ABI.
///
/// Only the fields needed to encode constructor arguments are kept; the rest
/// of the descriptor is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiItem {
    /// Descriptor kind, e.g. `constructor`, `function` or `event`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the function, event or error. Absent for constructors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared inputs, in order. Struct inputs keep their `components`.
    #[serde(default)]
    pub inputs: Vec<Param>,
}

/// A declared input of an [`AbiItem`].
///
/// Event inputs are accepted too; their `indexed` flag is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, possibly empty.
    #[serde(default)]
    pub name: String,
    /// Solidity type name, e.g. `uint256`, `address[]` or `tuple`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Fields of a `tuple` type, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
}

impl Param {
    /// Resolves the declared type, expanding `tuple` types from their
    /// `components`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the type is not a valid Solidity type.
    pub fn resolve(&self) -> Result<DynSolType> {
        self.to_json_abi().resolve().map_err(|e| {
            Error::Encoding(format!("invalid constructor type `{}`: {e}", self.ty))
        })
    }

    fn to_json_abi(&self) -> json_abi::Param {
        json_abi::Param {
            ty: self.ty.clone(),
            name: self.name.clone(),
            components: self.components.iter().map(Self::to_json_abi).collect(),
            internal_type: None,
        }
    }
}

impl AbiItem {
    /// Whether this descriptor is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.kind == CONSTRUCTOR
    }

    /// Declared input types, in order.
    pub fn input_types(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|param| param.ty.as_str())
    }
}

/// Finds the constructor taking exactly `arity` arguments.
///
/// Constructors are matched by argument count only. When several share the
/// same arity, the first one in declaration order is returned.
#[must_use]
pub fn find_constructor(abi: &[AbiItem], arity: usize) -> Option<&AbiItem> {
    abi.iter().find(|item| item.is_constructor() && item.inputs.len() == arity)
}

/// ABI-encodes `params` against the declared types of the constructor whose
/// arity matches `params.len()`.
///
/// Every argument is given in its string form and coerced to the declared
/// Solidity type. The result is the standard parameter encoding, ready to be
/// appended to the contract's bytecode.
///
/// If no constructor matches, the encoding is empty and the contract gets
/// deployed as if it took no arguments.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if a declared type is not a valid Solidity
/// type, or an argument can't be coerced to its declared type.
pub fn encode_constructor_params<S: AsRef<str>>(
    abi: &[AbiItem],
    params: &[S],
) -> Result<Bytes> {
    let Some(constructor) = find_constructor(abi, params.len()) else {
        if !params.is_empty() {
            tracing::warn!(
                arity = params.len(),
                "no constructor matches the given arguments, deploying without them"
            );
        }
        return Ok(Bytes::new());
    };

    let values = constructor
        .inputs
        .iter()
        .zip(params)
        .map(|(param, value)| coerce(param, value.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    if values.is_empty() {
        return Ok(Bytes::new());
    }

    Ok(DynSolValue::Tuple(values).abi_encode_params().into())
}

/// Coerces the string form of an argument to the declared type of `param`.
fn coerce(param: &Param, value: &str) -> Result<DynSolValue> {
    let ty = &param.ty;
    let sol_type = param.resolve()?;
    sol_type.coerce_str(value).map_err(|e| {
        Error::Encoding(format!("argument `{value}` is not a valid {ty}: {e}"))
    })
}
