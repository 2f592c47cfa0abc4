//! Phish Shield Core
//!
//! Probes a URL through several unreliable channels, assembles a fixed
//! 19-slot feature vector and classifies it with a pretrained model.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;
