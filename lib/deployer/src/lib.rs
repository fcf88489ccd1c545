/*!
# Deployer

Deploys compiled EVM contracts to a node and waits for them to be mined.

A deployment fetches the sender's next nonce, ABI-encodes the constructor
arguments, signs a legacy contract-creation transaction, submits it and then
looks its receipt up on every new block until it is found or a block budget
runs out.

## Usage

```ignore
use deployer::{Deployer, KeyPair};

let deployer = Deployer::connect("/home/user/.ethereum/geth.ipc").await?;
let contract = deployer.compile_contract("contracts/Token.sol").await?;
let key_pair: KeyPair = std::env::var("PRIVATE_KEY")?.parse()?;
let gas_price = deployer.current_gas_price().await?;

let receipt = deployer
    .deploy_contract(&key_pair, &contract, &["1000000"], gas_price, 3_000_000)
    .await?;
```
*/

#![allow(clippy::module_name_repetitions)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod abi;
pub mod account;
pub mod compile;
pub mod confirmation;
pub mod contract;
pub mod deploy;
pub mod error;
pub mod node;
pub mod nonce;
pub mod provider;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::KeyPair;
pub use compile::Compiler;
pub use confirmation::DEFAULT_MAX_BLOCKS;
pub use contract::Contract;
pub use deploy::Deployer;
pub use error::{Error, Result};
pub use node::{BlockSubscription, Node};
pub use provider::ProviderNode;
pub use transaction::{parse_quantity, RawTransaction, SignedTransaction};
