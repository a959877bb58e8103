//! Local identity backend

pub mod provider;

pub use provider::*;
