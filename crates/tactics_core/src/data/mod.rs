//! Data structures for map and unit definitions.
//!
//! This module contains pure data structures designed to be deserialized
//! from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. File loading is handled by `tactics_tools` or the host.

mod map_data;
mod unit_data;

pub use map_data::{MapData, TileSpec};
pub use unit_data::UnitData;
