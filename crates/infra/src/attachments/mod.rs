//! Attachment blob storage

pub mod store;

pub use store::*;
