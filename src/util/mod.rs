//! Utility types shared by every layer of the crate.
//!
//! - [`DType`] - Element type tags stored in metadata
//! - [`Error`] / [`Result`] - Error handling

mod dtype;
mod error;

pub use dtype::*;
pub use error::*;
