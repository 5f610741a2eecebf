//! A display-agnostic CHIP-8 virtual machine core.
//!
//! The crate owns the fetch-decode-execute engine, the machine state, and
//! the timer cadence, and nothing else: rendering the frame buffer, sampling
//! keys into the keypad, reading program images from storage, and the host
//! event loop all belong to outside collaborators wired up through the
//! [`Chip8`] interface. Diagnostics go through the `log` facade; the host
//! picks the logger.

pub use crate::chip8::Chip8;
pub use crate::config::Config;
pub use crate::fault::Fault;
pub use crate::state::{FrameBuffer, Keypad, State};

mod chip8;
mod config;
pub mod constants;
mod fault;
mod instruction;
mod operations;
pub mod state;
mod word;
