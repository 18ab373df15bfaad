//! # Shaderbox Core
//!
//! Document-agnostic building blocks for the Shaderbox editor.

pub mod undo;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
