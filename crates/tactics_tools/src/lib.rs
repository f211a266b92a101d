//! # Tactics Development Tools
//!
//! Command-line tools for development:
//! - Map and config validation
//! - Path, range and fight inspection against a map file
//! - ASCII board rendering through the engine's renderer seam

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod commands;
pub mod error;
pub mod validate;

pub use error::{Result, ToolError};
