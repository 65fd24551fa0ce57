//! Hearth Core - Foundational types for the Hearth particle engine
//!
//! This crate provides the types that all other Hearth crates depend on:
//! - `Vec3`, `Color` - Spatial and color value types
//! - Error types and Result alias

mod error;
mod types;

pub use error::{HearthError, Result};
pub use types::{Color, Vec3};
