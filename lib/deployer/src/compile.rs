//! Compilation of Solidity sources with the `solc` command-line compiler.
//!
//! The command-line compiler is used (rather than standard JSON) so that it
//! resolves `import`s relative to the source file.
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::{
    abi::AbiItem,
    contract::Contract,
    error::{Error, Result},
};

/// Default compiler executable, looked up in `PATH`.
pub const DEFAULT_SOLC: &str = "solc";

/// 0-indexed line holding the first contract's header.
const HEADER_LINE: usize = 1;
/// 0-indexed line holding the first contract's bytecode.
const BYTECODE_LINE: usize = 3;
/// 0-indexed line holding the first contract's JSON ABI.
const ABI_LINE: usize = 5;

/// Matches `======= path/to/Source.sol:Name =======`.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^=+\s*(?:.*:)?(\w+)\s*=+$").expect("header regex is valid")
});

/// A Solidity compiler.
#[derive(Clone, Debug)]
pub struct Compiler {
    solc: PathBuf,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_SOLC)
    }
}

impl Compiler {
    /// Creates a compiler running the `solc` executable.
    pub fn new(solc: impl Into<PathBuf>) -> Self {
        Self { solc: solc.into() }
    }

    /// Path of the compiler executable.
    #[must_use]
    pub fn solc(&self) -> &Path {
        &self.solc
    }

    /// Compiles the Solidity source at `source`.
    ///
    /// Only the first contract of the compiler's output is returned; for a
    /// source file declaring several contracts, the main one must come first.
    ///
    /// # Errors
    ///
    /// - [`Error::Compile`] if the compiler can't be run, fails, or reports
    ///   anything on its error stream (including warnings).
    /// - [`Error::AbiParse`] if its output doesn't have the expected layout.
    pub async fn compile(&self, source: impl AsRef<Path>) -> Result<Contract> {
        let source = source.as_ref();
        let output = Command::new(&self.solc)
            .args(["--bin", "--abi"])
            .arg(source)
            .output()
            .await
            .map_err(|e| {
                Error::Compile(format!(
                    "failed to execute `{}`: {e}",
                    self.solc.display()
                ))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::Compile(format!(
                "`{}` exited with {}: {}",
                self.solc.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.is_empty() {
            return Err(Error::Compile(stderr.trim().to_owned()));
        }

        let contract = parse_output(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(
            source = %source.display(),
            name = contract.name.as_deref().unwrap_or_default(),
            "compiled contract"
        );
        Ok(contract)
    }
}

/// Extracts the first contract from the output of `solc --bin --abi`.
///
/// The output looks like:
///
/// ```text
///
/// ======= Token.sol:Token =======
/// Binary:
/// 608060405234801561001057600080fd5b50...
/// Contract JSON ABI
/// [{"inputs":[],"stateMutability":"nonpayable","type":"constructor"}]
/// ```
///
/// # Errors
///
/// Returns [`Error::AbiParse`] if the ABI line is missing or isn't valid
/// JSON.
pub fn parse_output(stdout: &str) -> Result<Contract> {
    let lines: Vec<&str> =
        stdout.split('\n').map(|line| line.trim_end_matches('\r')).collect();

    let abi_json = lines
        .get(ABI_LINE)
        .ok_or_else(|| Error::AbiParse("missing contract abi".to_owned()))?;
    let abi: Vec<AbiItem> = serde_json::from_str(abi_json)
        .map_err(|e| Error::AbiParse(format!("{abi_json}: {e}")))?;

    // Interfaces and abstract contracts have an empty bytecode line.
    let code = lines.get(BYTECODE_LINE).map_or("", |line| line.trim());

    let name = lines
        .get(HEADER_LINE)
        .and_then(|line| HEADER.captures(line.trim()))
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_owned());

    Ok(Contract { name, code: code.to_owned(), abi })
}
