//! Event handling for MutualRisk.
//!
//! This module turns terminal input into store [`Action`](crate::state::Action)s.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, KeyBinding, Modifiers};
