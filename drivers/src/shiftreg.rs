//! Buffered output to an 8-line I2C shift register or port expander.

use crate::buffer::OutputBuffer;
use crate::i2c::I2cByteExt;
use crate::DriverResult;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::warn;
use std::fmt::{Debug, Formatter};

/// An I2C shift register whose outputs are changed in memory and sent on request.
///
/// Line changes never touch the bus. [Self::write_buffer] pushes all of them in one transfer.
/// There is no read-back, the buffer matches the chip only after a successful write.
pub struct BufferedShiftRegister<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
    buffer: OutputBuffer,
}

impl<I2C: I2c> BufferedShiftRegister<I2C> {
    /// Creates a new `BufferedShiftRegister` with every line active-high.
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self::with_polarity(i2c, address, OutputBuffer::DEFAULT_POLARITY)
    }

    /// Creates a new `BufferedShiftRegister` with the given polarity mask.
    ///
    /// A `0` bit makes the corresponding line active-low.
    pub fn with_polarity(i2c: I2C, address: SevenBitAddress, polarity: u8) -> Self {
        BufferedShiftRegister {
            i2c,
            address,
            buffer: OutputBuffer::new(polarity),
        }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub fn buffer(&self) -> &OutputBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut OutputBuffer {
        &mut self.buffer
    }

    pub fn set(&mut self, line: usize) {
        self.buffer.set(line);
    }

    pub fn clear(&mut self, line: usize) {
        self.buffer.clear(line);
    }

    pub fn write(&mut self, line: usize, state: bool) {
        self.buffer.write(line, state);
    }

    pub fn set_buffer(&mut self) {
        self.buffer.set_buffer();
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear_buffer();
    }

    /// Sends the buffer to the shift register.
    ///
    /// The chip does not acknowledge anything beyond the bus itself. Callers that don't care
    /// about bus failures can drop the result.
    pub fn write_buffer(&mut self) -> DriverResult<()> {
        self.i2c
            .send_byte(self.address, self.buffer.value())
            .inspect_err(|err| {
                warn!("Writing shift register 0x{:02x} failed: {}", self.address, err);
            })
    }

    /// Releases the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Debug for BufferedShiftRegister<I2C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BufferedShiftRegister(0x{:02x}, {:?})", self.address, self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverError;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x20;

    #[test]
    fn line_changes_are_batched_into_one_write() {
        let i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![0b10000101])]);
        let mut register = BufferedShiftRegister::new(i2c, ADDR);

        register.set(0);
        register.set(2);
        register.write(7, true);
        register.write(3, false);
        register.write_buffer().unwrap();

        register.release().done();
    }

    #[test]
    fn nothing_is_sent_until_requested() {
        let i2c = I2cMock::new(&[]);
        let mut register = BufferedShiftRegister::new(i2c, ADDR);

        register.set_buffer();
        register.clear(4);
        assert_eq!(register.buffer().value(), 0b11101111);

        register.release().done();
    }

    #[test]
    fn active_low_lines_are_inverted() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b11110000]),
            I2cTransaction::write(ADDR, vec![0b11110001]),
            I2cTransaction::write(ADDR, vec![0b00001111]),
        ]);
        let mut register = BufferedShiftRegister::with_polarity(i2c, ADDR, 0b00001111);

        // cleared: active-high lines low, active-low lines high
        register.write_buffer().unwrap();
        register.set(0);
        register.set(4);
        register.set(5);
        register.clear(5);
        // line 4 is active-low, clearing it drives it back high
        register.write(4, false);
        register.write_buffer().unwrap();
        register.set_buffer();
        register.write_buffer().unwrap();

        register.release().done();
    }

    #[test]
    fn bus_failure_is_reported() {
        let nack = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b00000000]).with_error(nack),
            I2cTransaction::write(ADDR, vec![0b00000000]),
        ]);
        let mut register = BufferedShiftRegister::new(i2c, ADDR);

        assert_eq!(register.write_buffer(), Err(DriverError::Bus(nack)));
        // the buffer is untouched, so a retry sends the same byte
        register.write_buffer().unwrap();

        register.release().done();
    }
}
