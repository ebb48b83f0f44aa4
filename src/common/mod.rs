//! Common types and utilities shared across the container and decoder layers.
//!
//! This module provides the binary readers, the unified error type and the
//! style value types used by both the OLE2 container and the Visio decoder.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod style;

// Re-exports for convenience
pub use error::{Error, Result};
pub use style::Color;
