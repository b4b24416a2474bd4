//! Display task
//!
//! Owns the [`DisplayManager`] and is the only place display state is
//! touched. Runs the 10 Hz periodic update and executes console commands
//! between ticks.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Instant, Ticker};
use embedded_hal_bus::i2c::RefCellDevice;

use marquee_core::manager::TICKS_PER_SECOND;
use marquee_core::{execute, DisplayManager};
use marquee_drivers::Hardware;

use crate::channels::{Response, COMMAND_CHANNEL, RESPONSE_CHANNEL};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1000 / TICKS_PER_SECOND as u64;

/// I2C bus shared by all display drivers
pub type I2cBus = I2c<'static, I2C0, Blocking>;

/// Display manager over the descriptor table
pub type Display = DisplayManager<Hardware<RefCellDevice<'static, I2cBus>, Delay>>;

/// Display task - periodic refresh and command execution
#[embassy_executor::task]
pub async fn display_task(mut display: Display) {
    info!("Display task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut reported_failures = 0;

    loop {
        match select(ticker.next(), COMMAND_CHANNEL.receive()).await {
            Either::First(()) => {
                let now_ms = Instant::now().as_millis();
                if display.periodic(now_ms) {
                    trace!("Display row pushed");
                }

                let failures = display.failures();
                if failures != reported_failures {
                    warn!("Display write failed ({} total)", failures);
                    reported_failures = failures;
                }
            }
            Either::Second(line) => {
                let mut response = Response::new();
                match execute(&mut display, line.as_str(), &mut response) {
                    Ok(()) => debug!("Command ok: {}", line.as_str()),
                    Err(e) => warn!("Command failed: {} ({:?})", line.as_str(), e),
                }
                RESPONSE_CHANNEL.send(response).await;
            }
        }
    }
}
