//! Core invoice types, validation and totals.
//!
//! This module provides the invoice description consumed by the generators,
//! the structural validation run before any output is produced, and the
//! EN 16931 totals shared by the XML and PDF renderings.

mod builder;
mod calculation;
mod error;
mod types;
mod validation;

pub use builder::*;
pub use calculation::*;
pub use error::*;
pub use types::*;
pub use validation::*;
