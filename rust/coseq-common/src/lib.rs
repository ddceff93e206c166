//! Core definitions (error type, result alias and small helpers), relied upon
//! by all coseq-* crates.

pub mod async_runtime;
pub mod error;
pub mod macros;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;
