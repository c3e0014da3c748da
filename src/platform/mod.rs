//! Platform abstraction layer
//!
//! Turns browser/native input events into per-tick intents. Nothing in here
//! touches game state directly.

pub mod input;

pub use input::{InputState, Key};
