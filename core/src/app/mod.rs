//! Application framework types and utilities
//!
//! This module contains the host-agnostic application pieces: the event
//! loop that schedules frames and the persisted configuration.

pub mod config;
pub mod event_loop;

pub use config::Config;
pub use event_loop::{AppEventHandler, HostApp, run};
