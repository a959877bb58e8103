//! Shared test helpers for `supportdesk-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight in-memory mocks
//! so that service tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod accounts;
pub mod stores;
