//! Message slots
//!
//! A fixed set of independently timed messages shown in rotation. Slots
//! are never destroyed, only overwritten or cleared in place.

use heapless::String;

use crate::error::DisplayError;

/// Number of message slots
pub const SLOT_COUNT: usize = 8;

/// Maximum tag length in bytes
pub const TAG_CAPACITY: usize = 32;

/// Maximum content length in bytes
pub const CONTENT_CAPACITY: usize = 64;

/// Tag installed with the fallback message
pub const FALLBACK_TAG: &str = "boot";

/// Tag value that suppresses the tag line entirely
pub const NO_TAG: &str = "-";

/// One message slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageSlot {
    /// Remaining lifetime in seconds, 0 = persistent
    pub timeout: u16,
    /// Short label shown on the tag line
    pub tag: String<TAG_CAPACITY>,
    /// Message body; empty means the slot is inactive
    pub content: String<CONTENT_CAPACITY>,
}

impl MessageSlot {
    /// Check if the slot holds a message
    pub fn is_active(&self) -> bool {
        !self.content.is_empty()
    }

    /// Reset the slot to its inactive state
    pub fn clear(&mut self) {
        self.timeout = 0;
        self.tag.clear();
        self.content.clear();
    }
}

/// What an expiry pass changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExpireOutcome {
    /// Number of slots cleared by this pass
    pub expired: u8,
    /// Whether slot 0 was refilled with the fallback message
    pub fallback: bool,
}

/// Fixed-capacity store of message slots
#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    slots: [MessageSlot; SLOT_COUNT],
}

impl SlotStore {
    /// Create a store with all slots inactive
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a slot by index
    pub fn get(&self, index: usize) -> Option<&MessageSlot> {
        self.slots.get(index)
    }

    /// Iterate over all slots in index order
    pub fn iter(&self) -> impl Iterator<Item = &MessageSlot> {
        self.slots.iter()
    }

    /// Number of slots currently holding a message
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Overwrite a slot
    ///
    /// Tag and content longer than the slot capacity are truncated.
    pub fn set(
        &mut self,
        index: usize,
        timeout: u16,
        tag: &str,
        content: &str,
    ) -> Result<(), DisplayError> {
        let slot = self.slots.get_mut(index).ok_or(DisplayError::InvalidSlot)?;
        slot.timeout = timeout;
        slot.tag = truncated(tag);
        slot.content = truncated(content);
        Ok(())
    }

    /// Pick the slot to show
    ///
    /// Scans forward from `start` (or the slot after it when advancing)
    /// for an active slot, wraps around to the beginning, and falls back
    /// to slot 0 when nothing is active.
    pub fn pick(&self, start: usize, advance: bool) -> usize {
        let first = if advance { start.saturating_add(1) } else { start };

        (first..SLOT_COUNT)
            .chain(0..SLOT_COUNT)
            .find(|&index| self.slots[index].is_active())
            .unwrap_or(0)
    }

    /// Age all slots by one second
    ///
    /// Slots at timeout 1 are cleared and longer timeouts count down;
    /// timeout 0 never expires. When no slot is left active, slot 0 gets
    /// the fallback message with timeout 1 so that it is dropped again as
    /// soon as any other message is present.
    pub fn expire(&mut self, default_message: &str) -> ExpireOutcome {
        let mut outcome = ExpireOutcome::default();

        for slot in self.slots.iter_mut() {
            match slot.timeout {
                0 => {}
                1 => {
                    slot.clear();
                    outcome.expired += 1;
                }
                _ => slot.timeout -= 1,
            }
        }

        if self.active_count() == 0 {
            let slot = &mut self.slots[0];
            slot.timeout = 1;
            slot.tag = truncated(FALLBACK_TAG);
            slot.content = truncated(default_message);
            outcome.fallback = true;
        }

        outcome
    }
}

/// Copy as much of `text` as fits, never splitting a character
pub(crate) fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_inactive() {
        let store = SlotStore::new();
        assert_eq!(store.active_count(), 0);
        assert_eq!(store.iter().count(), SLOT_COUNT);
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut store = SlotStore::new();
        assert_eq!(
            store.set(SLOT_COUNT, 0, "tag", "text"),
            Err(DisplayError::InvalidSlot)
        );
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = SlotStore::new();
        store.set(2, 10, "a", "first").unwrap();
        store.set(2, 0, "b", "second").unwrap();

        let slot = store.get(2).unwrap();
        assert_eq!(slot.timeout, 0);
        assert_eq!(slot.tag.as_str(), "b");
        assert_eq!(slot.content.as_str(), "second");
    }

    #[test]
    fn test_set_truncates_on_char_boundary() {
        let mut store = SlotStore::new();
        // 31 ASCII bytes plus a two-byte character does not fit in 32
        let tag = "0123456789012345678901234567890é";
        store.set(0, 0, tag, "x").unwrap();
        assert_eq!(store.get(0).unwrap().tag.len(), 31);
    }

    #[test]
    fn test_pick_scans_forward_and_wraps() {
        let mut store = SlotStore::new();
        store.set(1, 0, "", "one").unwrap();
        store.set(5, 0, "", "five").unwrap();

        assert_eq!(store.pick(1, false), 1);
        assert_eq!(store.pick(1, true), 5);
        assert_eq!(store.pick(5, true), 1);
        assert_eq!(store.pick(7, true), 1);
    }

    #[test]
    fn test_pick_falls_back_to_zero() {
        let store = SlotStore::new();
        assert_eq!(store.pick(3, true), 0);
        assert_eq!(store.pick(SLOT_COUNT - 1, true), 0);
    }

    #[test]
    fn test_pick_out_of_range_start() {
        let mut store = SlotStore::new();
        assert_eq!(store.pick(usize::MAX, true), 0);

        store.set(4, 0, "", "four").unwrap();
        assert_eq!(store.pick(usize::MAX, true), 4);
        assert_eq!(store.pick(SLOT_COUNT + 3, false), 4);
    }

    #[test]
    fn test_expire_clears_at_one() {
        let mut store = SlotStore::new();
        store.set(3, 1, "t", "gone").unwrap();
        store.set(4, 0, "t", "stays").unwrap();

        let outcome = store.expire("idle");
        assert_eq!(outcome.expired, 1);
        assert!(!outcome.fallback);

        let slot = store.get(3).unwrap();
        assert_eq!(slot.timeout, 0);
        assert!(slot.tag.is_empty());
        assert!(slot.content.is_empty());
        assert!(store.get(4).unwrap().is_active());
    }

    #[test]
    fn test_expire_counts_down() {
        // Timeouts above one are decremented by the same per-second pass
        let mut store = SlotStore::new();
        store.set(1, 3, "t", "msg").unwrap();

        store.expire("idle");
        assert_eq!(store.get(1).unwrap().timeout, 2);
        store.expire("idle");
        assert_eq!(store.get(1).unwrap().timeout, 1);
        assert!(store.get(1).unwrap().is_active());
        store.expire("idle");
        assert!(!store.get(1).unwrap().is_active());
    }

    #[test]
    fn test_expire_installs_fallback() {
        let mut store = SlotStore::new();
        let outcome = store.expire("hello");
        assert!(outcome.fallback);

        let slot = store.get(0).unwrap();
        assert_eq!(slot.tag.as_str(), FALLBACK_TAG);
        assert_eq!(slot.content.as_str(), "hello");
        assert_eq!(slot.timeout, 1);
    }

    #[test]
    fn test_fallback_persists_while_nothing_else_active() {
        let mut store = SlotStore::new();
        store.expire("hello");
        store.expire("hello");
        assert!(store.get(0).unwrap().is_active());
        assert_eq!(store.get(0).unwrap().content.as_str(), "hello");
    }

    #[test]
    fn test_fallback_yields_to_real_message() {
        let mut store = SlotStore::new();
        store.expire("hello");
        store.set(2, 0, "door", "open").unwrap();

        let outcome = store.expire("hello");
        assert!(!outcome.fallback);
        assert!(!store.get(0).unwrap().is_active());
        assert_eq!(store.pick(0, true), 2);
    }
}
