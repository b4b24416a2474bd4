//! Display manager
//!
//! Owns all display state: the bound driver, the message slots and the
//! display configuration. The firmware calls [`DisplayManager::periodic`]
//! ten times per second and routes console commands through the same
//! owner, so every access happens from a single execution context.
//!
//! # State machine
//!
//! ```text
//! ┌────────────┐  probe: first driver whose init succeeds  ┌───────────────┐
//! │ Undetected │ ─────────────────────────────────────────▶ │ Bound(index)  │
//! └────────────┘                                            └───────────────┘
//! ```
//!
//! The transition happens once, in [`DisplayManager::probe`]. A manager that
//! stays undetected turns every display operation into a no-op that reports
//! [`DisplayError::NotDetected`].

use core::fmt::Write;

use heapless::String;

use crate::config::{ConfigError, DisplayConfig, STATUS_SENTINEL};
use crate::error::DisplayError;
use crate::slots::{ExpireOutcome, SlotStore, NO_TAG, TAG_CAPACITY};
use crate::traits::{DisplayDriver, DisplayInfo};

/// Number of `periodic` calls per second
pub const TICKS_PER_SECOND: u8 = 10;

/// Decorated tag: "HH:MM " + tag + " [n]"
const TAG_LINE_CAPACITY: usize = TAG_CAPACITY + 16;

/// Status line: "HH.MM name type"
const STATUS_CAPACITY: usize = 64;

struct Bound<D> {
    index: usize,
    driver: D,
}

/// Display manager
pub struct DisplayManager<D> {
    bound: Option<Bound<D>>,
    slots: SlotStore,
    current_slot: usize,
    config: DisplayConfig,
    /// Periodic calls since the last expiry pass
    ticks: u8,
    /// Uptime of the last rotation, `None` before the first frame
    last_flip_ms: Option<u64>,
    /// Uptime as of the last `periodic` call
    now_ms: u64,
    /// Failed periodic hardware writes since boot
    failures: u32,
}

impl<D: DisplayDriver> DisplayManager<D> {
    /// Detect the display and create the manager
    ///
    /// Drivers are probed in table order; the first one whose `init`
    /// succeeds is bound for the lifetime of the manager.
    pub fn probe<I>(table: I, config: DisplayConfig) -> Self
    where
        I: IntoIterator<Item = D>,
    {
        let bound = table
            .into_iter()
            .enumerate()
            .find_map(|(index, mut driver)| driver.init().ok().map(|()| Bound { index, driver }));

        let mut manager = Self {
            bound,
            slots: SlotStore::new(),
            current_slot: 0,
            config,
            ticks: 0,
            last_flip_ms: None,
            now_ms: 0,
            failures: 0,
        };

        // Install the fallback message before the first frame
        manager.expire_tick();
        manager
    }

    /// Index of the detected variant in the descriptor table
    pub fn detected(&self) -> Option<usize> {
        self.bound.as_ref().map(|bound| bound.index)
    }

    /// Metadata of the detected variant
    pub fn info(&self) -> Option<&'static DisplayInfo> {
        self.bound.as_ref().map(|bound| bound.driver.info())
    }

    /// Get access to the bound driver
    pub fn driver(&self) -> Option<&D> {
        self.bound.as_ref().map(|bound| &bound.driver)
    }

    /// Slot currently shown
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Get access to the message slots
    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    /// Number of periodic hardware writes that failed since boot
    ///
    /// Failed frames are retried on the next flip and failed rows on the
    /// next `show`, so the caller only needs this for diagnostics.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Get the display configuration
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Set the rotation interval (1-60 seconds)
    pub fn set_flip_timeout(&mut self, seconds: u16) -> Result<(), ConfigError> {
        self.config.set_flip_timeout(seconds)
    }

    /// Set the message shown when no slot is active
    pub fn set_default_message(&mut self, text: &str) {
        self.config.set_default_message(text);
    }

    /// Periodic entry point, called [`TICKS_PER_SECOND`] times per second
    ///
    /// Runs the per-second expiry pass, rotates to the next slot when the
    /// flip interval has elapsed (or the clock went backwards) and calls
    /// the driver's `show`. Returns whether `show` did any work.
    pub fn periodic(&mut self, now_ms: u64) -> bool {
        if self.bound.is_none() {
            return false;
        }

        self.now_ms = now_ms;

        // Expiry runs before rotation so a new frame never shows stale slots
        self.ticks += 1;
        if self.ticks >= TICKS_PER_SECOND {
            self.ticks = 0;
            self.expire_tick();
        }

        let flip_due = match self.last_flip_ms {
            None => true,
            Some(last) => now_ms < last || now_ms - last >= self.config.flip_interval_ms(),
        };

        if flip_due {
            self.last_flip_ms = Some(now_ms);
            if self.update(true).is_err() {
                self.failures = self.failures.wrapping_add(1);
            }
        }

        match self.bound.as_mut() {
            Some(bound) if bound.driver.info().capabilities.show => match bound.driver.show() {
                Ok(worked) => worked,
                Err(_) => {
                    self.failures = self.failures.wrapping_add(1);
                    false
                }
            },
            _ => false,
        }
    }

    /// Age all slots by one second
    ///
    /// Called from [`periodic`](Self::periodic); exposed for callers that
    /// keep their own second timer.
    pub fn expire_tick(&mut self) -> ExpireOutcome {
        if self.bound.is_none() {
            return ExpireOutcome::default();
        }
        self.slots.expire(&self.config.default_message)
    }

    /// Overwrite a slot and re-render immediately without rotating
    pub fn set_slot(
        &mut self,
        index: usize,
        timeout: u16,
        tag: &str,
        content: &str,
    ) -> Result<(), DisplayError> {
        if self.bound.is_none() {
            return Err(DisplayError::NotDetected);
        }
        self.slots.set(index, timeout, tag, content)?;
        self.update(false)
    }

    /// Forward a brightness level to the hardware
    pub fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        let bound = self.bound.as_mut().ok_or(DisplayError::NotDetected)?;
        if !bound.driver.info().capabilities.brightness {
            return Err(DisplayError::Unsupported);
        }
        bound.driver.set_brightness(level)
    }

    /// Forward content directly to the hardware, bypassing the slots
    ///
    /// `None` suppresses the tag line; `Some("")` renders it blank.
    pub fn set_content(&mut self, tag: Option<&str>, text: &str) -> Result<(), DisplayError> {
        let bound = self.bound.as_mut().ok_or(DisplayError::NotDetected)?;
        bound.driver.set_content(tag, text)
    }

    /// Pick the slot to show and push its text to the driver
    fn update(&mut self, advance: bool) -> Result<(), DisplayError> {
        let bound = self.bound.as_mut().ok_or(DisplayError::NotDetected)?;

        let index = self.slots.pick(self.current_slot, advance);
        self.current_slot = index;
        let slot = self.slots.get(index).ok_or(DisplayError::InvalidSlot)?;

        let info = bound.driver.info();
        let (hours, minutes) = clock(self.now_ms);

        let mut status: String<STATUS_CAPACITY> = String::new();
        let text = if slot.content.as_str() == STATUS_SENTINEL {
            let _ = write!(
                status,
                "{:02}.{:02} {} {}",
                hours, minutes, info.name, info.type_label
            );
            status.as_str()
        } else {
            slot.content.as_str()
        };

        if slot.tag.as_str() == NO_TAG {
            return bound.driver.set_content(None, text);
        }

        if slot.tag.is_empty() {
            return bound.driver.set_content(Some(""), text);
        }

        let mut tag_line: String<TAG_LINE_CAPACITY> = String::new();
        let _ = write!(
            tag_line,
            "{:02}:{:02} {} [{}]",
            hours,
            minutes,
            slot.tag.as_str(),
            index
        );
        bound.driver.set_content(Some(tag_line.as_str()), text)
    }
}

/// Hours and minutes of the day from uptime
fn clock(now_ms: u64) -> (u64, u64) {
    let minutes = now_ms / 60_000;
    ((minutes / 60) % 24, minutes % 60)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::slots::{FALLBACK_TAG, SLOT_COUNT};
    use crate::traits::Capabilities;

    pub(crate) static MOCK_INFO: DisplayInfo = DisplayInfo {
        capacity: 80,
        name: "mock",
        type_label: "test display",
        capabilities: Capabilities {
            brightness: true,
            show: true,
        },
    };

    static MOCK_LED_INFO: DisplayInfo = DisplayInfo {
        capacity: 4,
        name: "mockled",
        type_label: "4 digit test display",
        capabilities: Capabilities {
            brightness: false,
            show: false,
        },
    };

    /// Driver that records what it was asked to display
    pub(crate) struct MockDisplay {
        pub info: &'static DisplayInfo,
        pub present: bool,
        pub inits: u8,
        pub tag: Option<String<64>>,
        pub text: String<64>,
        pub sets: u32,
        pub shows: u32,
        pub brightness: Option<u8>,
        /// Fail every content write and show
        pub broken: bool,
    }

    impl MockDisplay {
        pub(crate) fn new(present: bool) -> Self {
            Self {
                info: &MOCK_INFO,
                present,
                inits: 0,
                tag: None,
                text: String::new(),
                sets: 0,
                shows: 0,
                brightness: None,
                broken: false,
            }
        }
    }

    impl DisplayDriver for MockDisplay {
        fn info(&self) -> &'static DisplayInfo {
            self.info
        }

        fn init(&mut self) -> Result<(), DisplayError> {
            self.inits += 1;
            if self.present {
                Ok(())
            } else {
                Err(DisplayError::Communication)
            }
        }

        fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
            if level > 4 {
                return Err(DisplayError::InvalidValue);
            }
            self.brightness = Some(level);
            Ok(())
        }

        fn set_content(&mut self, tag: Option<&str>, text: &str) -> Result<(), DisplayError> {
            if self.broken {
                return Err(DisplayError::Communication);
            }
            self.tag = tag.map(|t| String::try_from(t).unwrap());
            self.text = String::try_from(text).unwrap();
            self.sets += 1;
            Ok(())
        }

        fn show(&mut self) -> Result<bool, DisplayError> {
            self.shows += 1;
            if self.broken {
                return Err(DisplayError::Communication);
            }
            Ok(true)
        }
    }

    pub(crate) fn bound_manager() -> DisplayManager<MockDisplay> {
        DisplayManager::probe([MockDisplay::new(true)], DisplayConfig::default())
    }

    #[test]
    fn test_probe_binds_first_present() {
        let table = [
            MockDisplay::new(false),
            MockDisplay::new(true),
            MockDisplay::new(true),
        ];
        let manager = DisplayManager::probe(table, DisplayConfig::default());
        assert_eq!(manager.detected(), Some(1));
        assert_eq!(manager.driver().unwrap().inits, 1);
    }

    #[test]
    fn test_probe_none_present() {
        let table = [MockDisplay::new(false), MockDisplay::new(false)];
        let mut manager = DisplayManager::probe(table, DisplayConfig::default());
        assert_eq!(manager.detected(), None);
        assert!(manager.info().is_none());
        assert!(!manager.periodic(0));
        assert_eq!(manager.set_brightness(1), Err(DisplayError::NotDetected));
        assert_eq!(
            manager.set_slot(0, 0, "t", "x"),
            Err(DisplayError::NotDetected)
        );
        assert_eq!(manager.slots().active_count(), 0);
    }

    #[test]
    fn test_fallback_installed_at_probe() {
        let manager = bound_manager();
        let slot = manager.slots().get(0).unwrap();
        assert_eq!(slot.tag.as_str(), FALLBACK_TAG);
        assert_eq!(slot.content.as_str(), STATUS_SENTINEL);
    }

    #[test]
    fn test_first_periodic_renders_status() {
        let mut manager = bound_manager();
        // 1 hour 5 minutes of uptime
        assert!(manager.periodic(3_900_000));

        let driver = manager.driver().unwrap();
        assert_eq!(driver.sets, 1);
        assert_eq!(driver.shows, 1);
        assert_eq!(driver.tag.as_deref(), Some("01:05 boot [0]"));
        assert_eq!(driver.text.as_str(), "01.05 mock test display");
    }

    #[test]
    fn test_rotation_follows_flip_timeout() {
        let mut manager = bound_manager();
        manager.set_flip_timeout(30).unwrap();
        manager.set_slot(1, 0, "a", "one").unwrap();
        manager.set_slot(2, 0, "b", "two").unwrap();

        manager.periodic(0);
        let first = manager.current_slot();

        // Not yet due
        manager.periodic(29_900);
        assert_eq!(manager.current_slot(), first);

        manager.periodic(30_000);
        assert_ne!(manager.current_slot(), first);
    }

    #[test]
    fn test_clock_backwards_forces_flip() {
        let mut manager = bound_manager();
        manager.set_slot(1, 0, "a", "one").unwrap();
        manager.set_slot(2, 0, "b", "two").unwrap();

        manager.periodic(50_000);
        let first = manager.current_slot();
        manager.periodic(1_000);
        assert_ne!(manager.current_slot(), first);
    }

    #[test]
    fn test_set_slot_renders_without_advancing() {
        let mut manager = bound_manager();
        manager.set_slot(3, 0, "door", "open").unwrap();

        // Slot 0 (fallback) is still active and is not skipped
        assert_eq!(manager.current_slot(), 0);
        assert_eq!(manager.driver().unwrap().sets, 1);
    }

    #[test]
    fn test_set_slot_overwrites_fallback_slot() {
        let mut manager = bound_manager();
        manager.expire_tick(); // fallback is refreshed, still slot 0
        manager.set_slot(0, 0, "door", "open").unwrap();

        let driver = manager.driver().unwrap();
        assert_eq!(driver.tag.as_deref(), Some("00:00 door [0]"));
        assert_eq!(driver.text.as_str(), "open");
    }

    #[test]
    fn test_set_slot_out_of_range() {
        let mut manager = bound_manager();
        assert_eq!(
            manager.set_slot(SLOT_COUNT, 0, "t", "x"),
            Err(DisplayError::InvalidSlot)
        );
        assert_eq!(manager.driver().unwrap().sets, 0);
    }

    #[test]
    fn test_dash_tag_suppresses_tag_line() {
        let mut manager = bound_manager();
        manager.set_slot(0, 0, "-", "plain").unwrap();
        let driver = manager.driver().unwrap();
        assert_eq!(driver.tag, None);
        assert_eq!(driver.text.as_str(), "plain");
    }

    #[test]
    fn test_empty_tag_renders_blank_tag_line() {
        let mut manager = bound_manager();
        manager.set_slot(0, 0, "", "plain").unwrap();
        assert_eq!(manager.driver().unwrap().tag.as_deref(), Some(""));
    }

    #[test]
    fn test_expiry_once_per_second() {
        let mut manager = bound_manager();
        manager.set_slot(1, 2, "t", "short").unwrap();

        for tick in 0..u64::from(TICKS_PER_SECOND) - 1 {
            manager.periodic(tick * 100);
        }
        assert_eq!(manager.slots().get(1).unwrap().timeout, 2);

        manager.periodic(900);
        assert_eq!(manager.slots().get(1).unwrap().timeout, 1);

        for tick in 10..20 {
            manager.periodic(tick * 100);
        }
        assert!(!manager.slots().get(1).unwrap().is_active());
    }

    #[test]
    fn test_all_expired_repopulates_slot_zero() {
        let mut manager = bound_manager();
        manager.set_default_message("idle");
        manager.set_slot(0, 1, "t", "brief").unwrap();

        manager.expire_tick();
        let slot = manager.slots().get(0).unwrap();
        assert_eq!(slot.tag.as_str(), FALLBACK_TAG);
        assert_eq!(slot.content.as_str(), "idle");
    }

    #[test]
    fn test_brightness_forwarded() {
        let mut manager = bound_manager();
        assert_eq!(manager.set_brightness(3), Ok(()));
        assert_eq!(manager.driver().unwrap().brightness, Some(3));
        assert_eq!(manager.set_brightness(9), Err(DisplayError::InvalidValue));
    }

    #[test]
    fn test_missing_capabilities() {
        let mut led = MockDisplay::new(true);
        led.info = &MOCK_LED_INFO;
        let mut manager = DisplayManager::probe([led], DisplayConfig::default());

        assert_eq!(manager.set_brightness(1), Err(DisplayError::Unsupported));
        assert!(!manager.periodic(0));
        assert_eq!(manager.driver().unwrap().shows, 0);
        assert_eq!(manager.driver().unwrap().sets, 1);
    }

    #[test]
    fn test_periodic_counts_write_failures() {
        let mut broken = MockDisplay::new(true);
        broken.broken = true;
        let mut manager = DisplayManager::probe([broken], DisplayConfig::default());
        assert_eq!(manager.failures(), 0);

        // First call fails both the frame update and the show
        assert!(!manager.periodic(0));
        assert_eq!(manager.failures(), 2);

        // No flip due, only the show fails
        assert!(!manager.periodic(100));
        assert_eq!(manager.failures(), 3);
    }

    #[test]
    fn test_healthy_display_has_no_failures() {
        let mut manager = bound_manager();
        for tick in 0..20 {
            manager.periodic(tick * 100);
        }
        assert_eq!(manager.failures(), 0);
    }

    #[test]
    fn test_set_content_passthrough() {
        let mut manager = bound_manager();
        manager.set_content(None, "direct").unwrap();
        let driver = manager.driver().unwrap();
        assert_eq!(driver.tag, None);
        assert_eq!(driver.text.as_str(), "direct");
    }
}
