//! Display hardware drivers
//!
//! This crate provides concrete implementations of the
//! [`DisplayDriver`] trait defined in marquee-core for the supported
//! display modules, all attached over I2C:
//!
//! - SAA1064 4-digit seven-segment LED driver
//! - HD44780 20x4 character LCD behind a PCF8574 I/O expander
//! - Matrix Orbital 20x4 VFD module
//!
//! [`descriptor_table`] lists them in detection order.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod hd44780;
pub mod orbital;
pub mod saa1064;

#[cfg(test)]
mod mock;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use marquee_core::{DisplayDriver, DisplayError, DisplayInfo};

pub use hd44780::Hd44780;
pub use orbital::MatrixOrbital;
pub use saa1064::Saa1064;

/// Any supported display variant
pub enum Hardware<I2C, D> {
    Saa1064(Saa1064<I2C>),
    Lcd(Hd44780<I2C, D>),
    Orbital(MatrixOrbital<I2C>),
}

/// Supported displays in detection order
///
/// Each driver gets its own handle to the (usually shared) I2C bus.
pub fn descriptor_table<I2C, D>(
    saa1064_bus: I2C,
    lcd_bus: I2C,
    orbital_bus: I2C,
    delay: D,
) -> [Hardware<I2C, D>; 3]
where
    I2C: I2c,
    D: DelayNs,
{
    [
        Hardware::Saa1064(Saa1064::new(saa1064_bus)),
        Hardware::Lcd(Hd44780::new(lcd_bus, delay)),
        Hardware::Orbital(MatrixOrbital::new(orbital_bus)),
    ]
}

impl<I2C: I2c, D: DelayNs> DisplayDriver for Hardware<I2C, D> {
    fn info(&self) -> &'static DisplayInfo {
        match self {
            Hardware::Saa1064(display) => display.info(),
            Hardware::Lcd(display) => display.info(),
            Hardware::Orbital(display) => display.info(),
        }
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        match self {
            Hardware::Saa1064(display) => display.init(),
            Hardware::Lcd(display) => display.init(),
            Hardware::Orbital(display) => display.init(),
        }
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        match self {
            Hardware::Saa1064(display) => display.set_brightness(level),
            Hardware::Lcd(display) => display.set_brightness(level),
            Hardware::Orbital(display) => display.set_brightness(level),
        }
    }

    fn set_content(&mut self, tag: Option<&str>, text: &str) -> Result<(), DisplayError> {
        match self {
            Hardware::Saa1064(display) => display.set_content(tag, text),
            Hardware::Lcd(display) => display.set_content(tag, text),
            Hardware::Orbital(display) => display.set_content(tag, text),
        }
    }

    fn show(&mut self) -> Result<bool, DisplayError> {
        match self {
            Hardware::Saa1064(display) => display.show(),
            Hardware::Lcd(display) => display.show(),
            Hardware::Orbital(display) => display.show(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, NoDelay};
    use marquee_core::{DisplayConfig, DisplayManager};

    fn table(present: u8) -> [Hardware<MockBus, NoDelay>; 3] {
        descriptor_table(
            MockBus::new(saa1064::SAA1064_ADDR, present == saa1064::SAA1064_ADDR),
            MockBus::new(hd44780::PCF8574_ADDR, present == hd44780::PCF8574_ADDR),
            MockBus::new(orbital::ORBITAL_ADDR, present == orbital::ORBITAL_ADDR),
            NoDelay,
        )
    }

    #[test]
    fn test_table_order_and_metadata() {
        let table = table(0);
        let names: std::vec::Vec<_> = table.iter().map(|hw| hw.info().name).collect();
        assert_eq!(names, ["saa1064", "hd44780", "matrix orbital"]);
        assert_eq!(table[0].info().capacity, 4);
        assert_eq!(table[1].info().capacity, 80);
        assert_eq!(table[2].info().capacity, 80);
    }

    #[test]
    fn test_detects_lcd() {
        let manager = DisplayManager::probe(table(hd44780::PCF8574_ADDR), DisplayConfig::default());
        assert_eq!(manager.detected(), Some(1));
        assert_eq!(manager.info().unwrap().type_label, "4x20 character LCD display");
    }

    #[test]
    fn test_detects_orbital() {
        let manager = DisplayManager::probe(table(orbital::ORBITAL_ADDR), DisplayConfig::default());
        assert_eq!(manager.detected(), Some(2));
    }

    #[test]
    fn test_nothing_attached() {
        let mut manager = DisplayManager::probe(table(0), DisplayConfig::default());
        assert_eq!(manager.detected(), None);
        assert!(!manager.periodic(0));
    }

    #[test]
    fn test_lcd_end_to_end() {
        let mut manager = DisplayManager::probe(table(hd44780::PCF8574_ADDR), DisplayConfig::default());
        manager.set_slot(0, 0, "-", "21°C").unwrap();

        // Four show calls push the four rows, then nothing is left
        for _ in 0..4 {
            assert!(manager.periodic(0));
        }
        assert!(!manager.periodic(0));

        let Some(Hardware::Lcd(lcd)) = manager.driver() else {
            panic!("lcd not bound");
        };
        assert_eq!(&lcd.buffer().row(0).unwrap()[..4], &[b'2', b'1', 0xdf, b'C']);
    }
}
