//! Prism Core - Foundational types for the Prism avatar inspector
//!
//! This crate provides the types every other Prism crate depends on:
//! - `Color` - RGBA color used by materials and gizmos
//! - `PrismConfig` - layered TOML configuration
//! - Error types and Result alias

pub mod config;
mod error;
mod types;

pub use config::{CameraConfig, HighlightConfig, LayerConfig, PrismConfig};
pub use error::{PrismError, Result};
pub use types::Color;
