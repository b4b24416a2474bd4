//! Console UART task
//!
//! Reads command lines from the console UART, hands them to the display
//! task and writes back the command output.

use defmt::*;
use embassy_rp::uart::{BufferedUart, Error as UartError};
use embedded_io_async::{Read, Write};
use heapless::Vec;

use crate::channels::{Line, LINE_CAPACITY, COMMAND_CHANNEL, RESPONSE_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Console task - line editor and command round trip
#[embassy_executor::task]
pub async fn console_task(mut uart: BufferedUart) {
    info!("Console task started");

    let mut pending: Vec<u8, LINE_CAPACITY> = Vec::new();
    let mut overflow = false;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match uart.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match byte {
                b'\r' | b'\n' => {
                    if overflow {
                        warn!("Console line too long, dropped");
                        let _ = uart.write_all(b"line too long\r\n").await;
                    } else if let Some(line) = to_line(&pending) {
                        if !line.trim().is_empty() {
                            run(&mut uart, line).await;
                        }
                    } else {
                        warn!("Console line is not valid UTF-8");
                        let _ = uart.write_all(b"invalid input\r\n").await;
                    }
                    pending.clear();
                    overflow = false;
                }
                // Backspace and delete remove a whole character
                0x08 | 0x7f => {
                    while let Some(last) = pending.pop() {
                        if last & 0xc0 != 0x80 {
                            break;
                        }
                    }
                }
                _ => overflow |= pending.push(byte).is_err(),
            }
        }
    }
}

fn to_line(bytes: &[u8]) -> Option<Line> {
    let text = core::str::from_utf8(bytes).ok()?;
    Line::try_from(text).ok()
}

/// Execute one line on the display task and print its output
async fn run(uart: &mut BufferedUart, line: Line) {
    COMMAND_CHANNEL.send(line).await;
    let response = RESPONSE_CHANNEL.receive().await;

    if let Err(e) = write_crlf(uart, response.as_str()).await {
        warn!("UART write error: {:?}", e);
    }
}

/// Write text, translating line feeds for the terminal
async fn write_crlf(uart: &mut BufferedUart, text: &str) -> Result<(), UartError> {
    for chunk in text.split_inclusive('\n') {
        match chunk.strip_suffix('\n') {
            Some(body) => {
                uart.write_all(body.as_bytes()).await?;
                uart.write_all(b"\r\n").await?;
            }
            None => uart.write_all(chunk.as_bytes()).await?,
        }
    }
    Ok(())
}
