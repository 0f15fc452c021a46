pub mod buffer;
pub mod buzzer;
pub mod delay;
pub mod gpiod;
pub mod i2c;
pub mod keypad;
pub mod shiftreg;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum DriverError {
    #[error("I2C bus error: {0}")]
    Bus(embedded_hal::i2c::ErrorKind),
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.kind())
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Specifies the active level of a GPIO output line.
///
/// By default, the active level is high.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

/// A single digital output line, already configured as an output.
pub trait GpioOutput: Debug {
    /// Writes the logical state of the line.
    fn write(&self, value: bool) -> DriverResult<()>;
}
