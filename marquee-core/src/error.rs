//! Display error type

use core::fmt;

/// Errors reported by display operations
///
/// None of these are fatal; the firmware keeps running with the display
/// disabled or the request rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// No display hardware was detected at boot
    NotDetected,
    /// Hardware lacks the requested optional capability
    Unsupported,
    /// Value rejected by the hardware (e.g. brightness level)
    InvalidValue,
    /// Slot index outside the slot store
    InvalidSlot,
    /// Bus transfer to the display failed
    Communication,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DisplayError::NotDetected => "no display detected",
            DisplayError::Unsupported => "not supported",
            DisplayError::InvalidValue => "invalid value",
            DisplayError::InvalidSlot => "slot out of limits",
            DisplayError::Communication => "communication error",
        };
        f.write_str(msg)
    }
}
