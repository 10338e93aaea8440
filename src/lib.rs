//! Tile Match (workspace facade crate).
//!
//! Re-exports the workspace crates as `tile_match::{core,adapter,types}` and adds the
//! headless [`autoplay`] driver used by the binary and the benches.

pub mod autoplay;

pub use tile_match_adapter as adapter;
pub use tile_match_core as core;
pub use tile_match_types as types;
