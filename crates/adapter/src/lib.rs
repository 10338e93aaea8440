//! Adapter module - drive a session from an external controller
//!
//! This crate lets a bot, a test harness or a renderer in another process play the
//! game over any byte stream. The binary serves it on stdio.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol**: one request per line,
//! one or more replies per request. Every message has `type` and `seq`; replies echo
//! the `seq` of the request they answer and add `ts` (timestamp in ms).
//!
//! # Message Types
//!
//! ## Client → Game
//!
//! - **pick**: pick the tile at `col`, `row`
//! - **tick**: advance timers by `elapsed_ms`
//! - **hint**: ask for an available move
//! - **snapshot**: ask for the full state
//! - **restart**: start a new episode
//!
//! ## Game → Client
//!
//! - **event**: one per engine event caused by a pick or tick, in order
//! - **outcome**: terminal reply to `pick`
//! - **ack**: terminal reply to `tick`
//! - **observation**: board, selection, phase, score and timers
//! - **hint**: a move, or `null` when there is none
//! - **error**: malformed request, unknown type or out-of-bounds pick
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Game: {"type":"pick","seq":1,"col":2,"row":0}
//! Game -> Client: {"type":"event","seq":1,"ts":1234567890,"event":{"name":"highlighted","tile":{...}}}
//! Game -> Client: {"type":"outcome","seq":1,"ts":1234567890,"result":"selected"}
//! Client -> Game: {"type":"pick","seq":2,"col":2,"row":1}
//! Game -> Client: {"type":"event","seq":2,...,"event":{"name":"swapped","a":{...},"b":{...},"accepted":true}}
//! ...
//! Game -> Client: {"type":"outcome","seq":2,"ts":1234567891,"result":"matched","report":{...}}
//! ```

pub mod protocol;
pub mod runtime;

pub use tile_match_core as core;
pub use tile_match_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::Runtime;
