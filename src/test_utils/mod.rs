//! Test utilities for use case and route tests.
//!
//! This module provides:
//! - A recording in-memory payment gateway with scripted failures
//! - Factories for requests and signed webhook deliveries
//! - A builder for an `AppState` wired to the in-memory gateway

mod app_state_builder;
mod factories;
mod gateway_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use gateway_mocks::*;
