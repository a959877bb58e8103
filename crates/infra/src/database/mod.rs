//! Database implementations

pub mod manager;
pub mod profile_store;
pub mod ticket_store;

pub use manager::*;
pub use profile_store::*;
pub use ticket_store::*;
