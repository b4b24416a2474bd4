//! Recording I2C bus for driver tests

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// I2C bus with a single (possibly absent) device that records every write
pub struct MockBus {
    address: u8,
    present: bool,
    /// Payloads written to the device, one entry per write operation
    pub writes: Vec<Vec<u8>>,
}

impl MockBus {
    pub fn new(address: u8, present: bool) -> Self {
        Self {
            address,
            present,
            writes: Vec::new(),
        }
    }

    /// Simulate the device dropping off (or coming back on) the bus
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    /// All written bytes, concatenated
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flatten().copied().collect()
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present || address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.writes.push(bytes.to_vec()),
                Operation::Read(buffer) => buffer.fill(0),
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
