//! Display driver trait
//!
//! Every supported display variant exposes the same capability set:
//! initialize, set brightness, set content and show. Brightness and show
//! are optional; a driver that lacks them keeps the default methods.

use crate::error::DisplayError;

/// Optional operations a display variant supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// `set_brightness` is implemented
    pub brightness: bool,
    /// `show` must be called periodically to push the frame
    pub show: bool,
}

/// Static description of a display variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayInfo {
    /// Number of digits or character cells
    pub capacity: u8,
    /// Short hardware name
    pub name: &'static str,
    /// Human-readable display type
    pub type_label: &'static str,
    /// Optional operations
    pub capabilities: Capabilities,
}

/// Trait for display hardware
///
/// Implementations are probed in a fixed order at boot; the first one whose
/// [`init`](DisplayDriver::init) succeeds drives the display for the rest of
/// the process lifetime.
pub trait DisplayDriver {
    /// Static metadata for this variant
    fn info(&self) -> &'static DisplayInfo;

    /// Probe and initialize the hardware
    ///
    /// Returns an error if the display is not present.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set the brightness level
    fn set_brightness(&mut self, _level: u8) -> Result<(), DisplayError> {
        Err(DisplayError::Unsupported)
    }

    /// Set the frame content
    ///
    /// - `tag`: tag line, `None` to use every row for the text
    /// - `text`: message text (UTF-8, may contain line feeds)
    fn set_content(&mut self, tag: Option<&str>, text: &str) -> Result<(), DisplayError>;

    /// Push pending changes to the hardware
    ///
    /// Called every period when the variant has the `show` capability.
    /// Returns whether any work was done.
    fn show(&mut self) -> Result<bool, DisplayError> {
        Ok(false)
    }
}
