//! Console commands
//!
//! Handlers for the `display-*` commands of the console. Each command
//! writes a short human-readable status line to `out`, on success and on
//! failure alike; callers tell the two apart from the returned `Result`.
//!
//! | Command                                     | Effect                              |
//! |---------------------------------------------|-------------------------------------|
//! | `display-dump`                              | Detected hardware and all slots     |
//! | `display-default-message <text>`            | Set the fallback message            |
//! | `display-flip-timeout [seconds]`            | Show or set the rotation interval   |
//! | `display-brightness <level>`                | Forward brightness to the hardware  |
//! | `display-set <slot> <timeout> <tag> <text>` | Overwrite a slot and re-render      |

use core::fmt::{self, Write};

use crate::config::{MAX_FLIP_TIMEOUT_S, MIN_FLIP_TIMEOUT_S};
use crate::error::DisplayError;
use crate::manager::DisplayManager;
use crate::slots::SLOT_COUNT;
use crate::traits::DisplayDriver;

/// Command errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// First token is not a display command
    UnknownCommand,
    /// Malformed arguments
    Usage,
    /// No display hardware bound
    NoDisplay,
    /// Slot index outside the slot store
    InvalidSlot,
    /// Flip timeout outside 1-60 seconds
    InvalidTimeout,
    /// Brightness rejected by the hardware
    InvalidBrightness,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CommandError::UnknownCommand => "unknown command",
            CommandError::Usage => "usage error",
            CommandError::NoDisplay => "no display detected",
            CommandError::InvalidSlot => "slot out of limits",
            CommandError::InvalidTimeout => "invalid timeout",
            CommandError::InvalidBrightness => "invalid brightness",
        };
        f.write_str(msg)
    }
}

/// Execute one console line
///
/// Output that does not fit in `out` is truncated.
pub fn execute<D, W>(
    manager: &mut DisplayManager<D>,
    line: &str,
    out: &mut W,
) -> Result<(), CommandError>
where
    D: DisplayDriver,
    W: Write,
{
    let (name, args) = next_token(line).ok_or(CommandError::UnknownCommand)?;

    match name {
        "display-dump" => {
            let _ = dump(manager, out);
            Ok(())
        }
        "display-default-message" => default_message(manager, args, out),
        "display-flip-timeout" => flip_timeout(manager, args, out),
        "display-brightness" => brightness(manager, args, out),
        "display-set" => set(manager, args, out),
        _ => {
            let _ = writeln!(out, "{}: unknown command", name);
            Err(CommandError::UnknownCommand)
        }
    }
}

/// Split off the first whitespace-delimited token
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    })
}

fn dump<D: DisplayDriver, W: Write>(manager: &DisplayManager<D>, out: &mut W) -> fmt::Result {
    let (Some(index), Some(info)) = (manager.detected(), manager.info()) else {
        return writeln!(out, "> no displays detected");
    };

    writeln!(
        out,
        "> display type #{} ({}: {})",
        index, info.name, info.type_label
    )?;

    for (slot_index, slot) in manager.slots().iter().enumerate() {
        writeln!(
            out,
            ">> {} slot {}: timeout {}, tag: \"{}\", text: \"{}\"",
            if slot_index == manager.current_slot() { '+' } else { ' ' },
            slot_index,
            slot.timeout,
            slot.tag.as_str(),
            slot.content.as_str()
        )?;
    }
    Ok(())
}

fn default_message<D: DisplayDriver, W: Write>(
    manager: &mut DisplayManager<D>,
    args: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    let text = args.trim();
    if !text.is_empty() {
        manager.set_default_message(text);
    }
    let _ = writeln!(
        out,
        "set default display message to \"{}\"",
        manager.config().default_message.as_str()
    );
    Ok(())
}

fn flip_timeout<D: DisplayDriver, W: Write>(
    manager: &mut DisplayManager<D>,
    args: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    if let Some((value, _)) = next_token(args) {
        let Ok(seconds) = value.parse::<u16>() else {
            let _ = writeln!(
                out,
                "display-flip-timeout: usage: <seconds>={}-{}",
                MIN_FLIP_TIMEOUT_S, MAX_FLIP_TIMEOUT_S
            );
            return Err(CommandError::Usage);
        };

        if manager.set_flip_timeout(seconds).is_err() {
            let _ = writeln!(out, "display-flip-timeout: invalid timeout: {}", seconds);
            return Err(CommandError::InvalidTimeout);
        }
    }

    let _ = writeln!(
        out,
        "display-flip-timeout: {} s",
        manager.config().flip_timeout_s
    );
    Ok(())
}

fn brightness<D: DisplayDriver, W: Write>(
    manager: &mut DisplayManager<D>,
    args: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    if manager.detected().is_none() {
        let _ = writeln!(out, "display-brightness: no display detected");
        return Err(CommandError::NoDisplay);
    }

    let Some(Ok(level)) = next_token(args).map(|(value, _)| value.parse::<u8>()) else {
        let _ = writeln!(out, "display-brightness: usage: <brightness>=0,1,2,3,4");
        return Err(CommandError::Usage);
    };

    match manager.set_brightness(level) {
        Ok(()) => {
            let _ = writeln!(out, "display-brightness: {}", level);
            Ok(())
        }
        Err(DisplayError::Unsupported) => {
            let _ = writeln!(out, "display-brightness: not supported by this display");
            Err(CommandError::InvalidBrightness)
        }
        Err(_) => {
            let _ = writeln!(out, "display-brightness: invalid brightness value: {}", level);
            Err(CommandError::InvalidBrightness)
        }
    }
}

fn set<D: DisplayDriver, W: Write>(
    manager: &mut DisplayManager<D>,
    args: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    if manager.detected().is_none() {
        let _ = writeln!(out, "display-set: no display detected");
        return Err(CommandError::NoDisplay);
    }

    let parsed = (|| {
        let (slot, rest) = next_token(args)?;
        let (timeout, rest) = next_token(rest)?;
        let (tag, rest) = next_token(rest)?;
        let text = rest.trim();
        if text.is_empty() {
            return None;
        }
        Some((slot.parse::<usize>().ok()?, timeout.parse::<u16>().ok()?, tag, text))
    })();

    let Some((slot, timeout, tag, text)) = parsed else {
        let _ = writeln!(out, "display-set: usage: slot timeout tag text");
        return Err(CommandError::Usage);
    };

    if slot >= SLOT_COUNT {
        let _ = writeln!(out, "display-set: slot #{} out of limits", slot);
        return Err(CommandError::InvalidSlot);
    }

    // Slot is stored even if the immediate re-render fails
    let _ = manager.set_slot(slot, timeout, tag, text);

    if let Some(stored) = manager.slots().get(slot) {
        let _ = writeln!(
            out,
            "display-set: set slot {} with tag {} to \"{}\"",
            slot,
            stored.tag.as_str(),
            stored.content.as_str()
        );
    }
    Ok(())
}
