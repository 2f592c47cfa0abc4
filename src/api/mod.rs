//! API Module
//!
//! Structure:
//! - commands.rs: validation and classification entry points
//!
//! Usage:
//! - `api::commands::classify_url(&pipeline, url, policy)`
//! - `api::classify_batch(pipeline, urls, policy)`

pub mod commands;

// Re-export current version as default
pub use commands::*;
