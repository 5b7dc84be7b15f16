//! Common types shared across Inkpress modules.

pub mod error;

pub use error::{Error, Result};
