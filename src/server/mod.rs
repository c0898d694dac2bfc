//! Service configuration and the JSON-lines transport.
//!
//! This module provides:
//! - Configuration types (`config`)
//! - The TCP service (`service`, server-only)
//!
//! The transport parses request lines, enforces [`config::LimitsConfig`] and
//! hands the text to the diagnosis and triage cores.

pub mod config;
#[cfg(feature = "server")]
pub mod service;

pub use config::Config;
#[cfg(feature = "server")]
pub use service::{MedAssistService, Request, Response, ResponseBody};
