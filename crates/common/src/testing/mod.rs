//! Testing utilities and helpers
//!
//! This module provides:
//! - **[`temp`]**: Temporary directory helpers for integration harnesses that
//!   need real filesystem scratch space.

pub mod temp;

// Re-export commonly used items
pub use temp::TempDir;
