//! Hardware abstraction traits
//!
//! These traits define the interface between the display logic
//! and hardware-specific driver implementations.

pub mod display;

pub use display::{Capabilities, DisplayDriver, DisplayInfo};
