//! Core utilities for the lumen renderer.
//!
//! This crate provides foundational types and utilities used across the renderer:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timing
//! - Configuration management
//! - Structured diagnostics for recoverable resource errors

pub mod config;
pub mod diagnostics;
mod error;
mod logging;
mod timer;

pub use config::LumenConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{Error, Result};
pub use logging::{init_logging, DEFAULT_LOG_FILTER};
pub use timer::Timer;
