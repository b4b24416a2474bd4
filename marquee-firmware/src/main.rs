//! Marquee - Message Display Firmware
//!
//! Main firmware binary for RP2040-based home-automation controllers.
//! Detects which display is attached to the I2C bus (SAA1064 LED, HD44780
//! LCD or Matrix Orbital VFD), rotates the message slots on it and serves
//! the `display-*` commands on the console UART.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::{parse_config, DisplayConfig, DisplayManager};
use marquee_drivers::descriptor_table;

use crate::tasks::display::I2cBus;

/// Embedded display configuration (compiled into firmware)
/// Edit display.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../display.toml");

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// The I2C bus is shared by all drivers in the descriptor table
static I2C_BUS: StaticCell<RefCell<I2cBus>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Marquee firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Display I2C bus (SDA=GPIO4, SCL=GPIO5)
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, I2cConfig::default());
    let bus: &'static RefCell<I2cBus> = I2C_BUS.init(RefCell::new(i2c));

    let table = descriptor_table(
        RefCellDevice::new(bus),
        RefCellDevice::new(bus),
        RefCellDevice::new(bus),
        Delay,
    );

    let brightness = config.brightness;
    let mut display = DisplayManager::probe(table, config);

    match (display.detected(), display.info()) {
        (Some(index), Some(info)) => {
            info!(
                "Display #{} detected: {} ({})",
                index, info.name, info.type_label
            );
        }
        _ => warn!("No display detected"),
    }

    if let Some(level) = brightness {
        if display.info().is_some_and(|info| info.capabilities.brightness) {
            match display.set_brightness(level) {
                Ok(()) => info!("Brightness set to {}", level),
                Err(e) => warn!("Failed to set brightness {}: {:?}", level, e),
            }
        }
    }

    // Console UART (TX=GPIO0, RX=GPIO1, 115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!("UART initialized for console");

    spawner.spawn(tasks::display_task(display)).unwrap();
    spawner.spawn(tasks::console_task(uart)).unwrap();

    info!("All tasks spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> DisplayConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config loaded: flip timeout {}s, default message \"{}\"",
                config.flip_timeout_s,
                config.default_message.as_str()
            );
            config
        }
        Err(e) => {
            // build.rs validates the same file, so this only trips on parser drift
            warn!("Invalid embedded config ({}), using defaults", e);
            DisplayConfig::default()
        }
    }
}
