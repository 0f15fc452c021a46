//! Single-byte I2C exchanges on top of [embedded_hal::i2c::I2c].
//!
//! Both expander-style chips driven by this crate talk in whole bytes with no register address,
//! so a write is one begin/send/end sequence and a read is one request/receive sequence.

use crate::{DriverError, DriverResult};
use embedded_hal::i2c::{Error, I2c, SevenBitAddress};
use log::trace;

/// Extension trait for I2C buses, providing the one-byte transfers the drivers use.
pub trait I2cByteExt {
    /// Sends a single byte to the device at `address`.
    fn send_byte(&mut self, address: SevenBitAddress, value: u8) -> DriverResult<()>;

    /// Requests a single byte from the device at `address`.
    fn receive_byte(&mut self, address: SevenBitAddress) -> DriverResult<u8>;
}

impl<T: I2c> I2cByteExt for T {
    fn send_byte(&mut self, address: SevenBitAddress, value: u8) -> DriverResult<()> {
        trace!("I2C 0x{:02x} <- {:08b}", address, value);
        self.write(address, &[value])
            .map_err(|err| DriverError::Bus(err.kind()))
    }

    fn receive_byte(&mut self, address: SevenBitAddress) -> DriverResult<u8> {
        let mut buf = [0u8; 1];
        self.read(address, &mut buf)
            .map_err(|err| DriverError::Bus(err.kind()))?;
        trace!("I2C 0x{:02x} -> {:08b}", address, buf[0]);
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn send_byte_is_one_single_byte_write() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(0x20, vec![0xA5])]);
        i2c.send_byte(0x20, 0xA5).unwrap();
        i2c.done();
    }

    #[test]
    fn receive_byte_reads_one_byte() {
        let mut i2c = I2cMock::new(&[I2cTransaction::read(0x27, vec![0x1E])]);
        assert_eq!(i2c.receive_byte(0x27).unwrap(), 0x1E);
        i2c.done();
    }

    #[test]
    fn bus_errors_keep_their_kind() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(0x20, vec![0x00]).with_error(ErrorKind::ArbitrationLoss),
            I2cTransaction::read(0x20, vec![0x00]).with_error(ErrorKind::Bus),
        ]);
        assert_eq!(
            i2c.send_byte(0x20, 0x00),
            Err(DriverError::Bus(ErrorKind::ArbitrationLoss))
        );
        assert_eq!(i2c.receive_byte(0x20), Err(DriverError::Bus(ErrorKind::Bus)));
        i2c.done();
    }
}
