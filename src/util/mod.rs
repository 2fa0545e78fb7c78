//! Shared types used across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`range`] - inclusive float ranges

mod error;
mod math;

pub use error::*;
pub use math::*;
