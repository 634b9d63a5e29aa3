//! Registry error type.
//!
//! Only validation failures surface as errors. Lookups report through
//! `Option`/`bool`, coordination through a structured outcome, and
//! persistence failures are logged behind the write-behind store, so
//! none of those paths construct an error value.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed registration input (unknown role, empty name, authority
    /// out of the 1-10 range). Registration does not proceed.
    #[error("invalid persona config: {0}")]
    Validation(String),
}
