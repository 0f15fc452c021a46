use crate::{DriverResult, GpioOutput};
use embedded_hal::delay::DelayNs;
use log::trace;
use std::fmt::{Debug, Formatter};

/// A piezo buzzer on an optional GPIO output, used for audible key feedback.
///
/// Beeping blocks the caller for the whole pattern.
pub struct Buzzer<'a, D> {
    pin: Option<&'a dyn GpioOutput>,
    delay: D,
    enabled: bool,
}

impl<'a, D: DelayNs> Buzzer<'a, D> {
    /// Creates a new buzzer. Beeping starts enabled if a pin is given.
    pub fn new(pin: Option<&'a dyn GpioOutput>, delay: D) -> Self {
        Buzzer {
            enabled: pin.is_some(),
            pin,
            delay,
        }
    }

    /// Gets whether a buzzer line is configured.
    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// Gets whether beeping is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Drives the line to its idle (low) level.
    pub fn idle(&mut self) -> DriverResult<()> {
        match self.pin {
            Some(pin) => pin.write(false),
            None => Ok(()),
        }
    }

    /// Sounds `repetitions` beeps, each `on_ms` long and followed by `off_ms` of silence.
    ///
    /// Does nothing if beeping is disabled or there is no buzzer line.
    pub fn beep(&mut self, on_ms: u32, off_ms: u32, repetitions: u32) -> DriverResult<()> {
        let Some(pin) = self.pin else {
            return Ok(());
        };
        if !self.enabled {
            return Ok(());
        }

        trace!("Beep {}x {}ms/{}ms", repetitions, on_ms, off_ms);
        for _ in 0..repetitions {
            pin.write(true)?;
            self.delay.delay_ms(on_ms);
            pin.write(false)?;
            self.delay.delay_ms(off_ms);
        }
        Ok(())
    }
}

impl<D> Debug for Buzzer<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Buzzer({:?}, enabled: {})", self.pin, self.enabled)
    }
}
