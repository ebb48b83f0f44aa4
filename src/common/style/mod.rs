//! Common style and formatting types.
//!
//! This module provides style value types shared by the decoder and the
//! collector interface.

// Submodule declarations
pub mod color;

// Re-exports
pub use color::Color;
