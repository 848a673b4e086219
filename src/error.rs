//! Centralized error type for the ctlmap umbrella crate.
//!
//! Wraps construction errors and recovered binding failures so `?` works on both.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ctlmap_core::Error),

    /// A bind, learn or automation call that was rejected.
    #[error("Binding: {0}")]
    Binding(#[from] ctlmap_core::ErrorKind),
}

pub type Result<T> = std::result::Result<T, Error>;
