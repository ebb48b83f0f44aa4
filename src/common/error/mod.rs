//! Unified error types for Longan.
//!
//! This module provides a unified error type that encompasses errors from both
//! the OLE2 container and the Visio decoder, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
