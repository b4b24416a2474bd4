//! Inter-task communication channels
//!
//! Console lines travel to the display task, which owns all display state,
//! and the command output travels back. Uses embassy-sync primitives.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

/// Longest console line accepted
pub const LINE_CAPACITY: usize = 160;

/// Command output buffer (a full `display-dump` fits)
pub const RESPONSE_CAPACITY: usize = 1536;

/// Console line
pub type Line = String<LINE_CAPACITY>;

/// Command output
pub type Response = String<RESPONSE_CAPACITY>;

/// Console lines waiting to be executed by the display task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Line, 2> = Channel::new();

/// Output of the last executed command
///
/// The console waits for the response before reading the next line, so a
/// single entry is enough.
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, Response, 1> = Channel::new();
