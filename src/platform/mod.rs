//! Platform abstraction layer
//!
//! Handles what the host provides:
//! - Input events, polled once per tick
//! - Frame timing for the fixed-step loop

pub mod input;
pub mod time;

pub use input::{InputEvent, InputSource, InputState, ScriptedInput};
pub use time::FrameClock;
