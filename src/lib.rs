//! Drinkmon firmware library.
//!
//! Exposes the session controller (shared state, the four tasks, the
//! scheduler) and its adapters for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod sensors;

#[cfg(target_os = "espidf")]
mod esp_link_shims;
