//! Board-agnostic display core for the message display firmware
//!
//! This crate contains all display logic that does not depend on
//! specific hardware implementations:
//!
//! - Codepage mapping from UTF-8 text to the 8-bit device character set
//! - Character render buffer with per-row dirty tracking
//! - Rotating message slots with expiry
//! - Display driver trait (the hardware descriptor interface)
//! - Display manager (detection, rotation, dispatch)
//! - Console command handlers
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod codepage;
pub mod command;
pub mod config;
pub mod error;
pub mod manager;
pub mod render;
pub mod slots;
pub mod traits;

pub use command::{execute, CommandError};
pub use config::{parse_config, ConfigError, DisplayConfig};
pub use error::DisplayError;
pub use manager::DisplayManager;
pub use render::RenderBuffer;
pub use slots::{MessageSlot, SlotStore};
pub use traits::{Capabilities, DisplayDriver, DisplayInfo};
