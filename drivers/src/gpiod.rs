//! GPIO outputs through the Linux GPIO character device, using the gpiod library.
use crate::{DriverResult, GpioActiveLevel, GpioOutput};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::path::Path;

impl From<GpioActiveLevel> for gpiod::Active {
    fn from(level: GpioActiveLevel) -> Self {
        match level {
            GpioActiveLevel::High => gpiod::Active::High,
            GpioActiveLevel::Low => gpiod::Active::Low,
        }
    }
}

/// A single line of a gpiochip, requested as an output.
///
/// The line is released when this is dropped.
pub struct GpiodOutput {
    chip_name: String,
    line_index: u32,
    line: gpiod::Lines<gpiod::Output>,
}

impl GpiodOutput {
    /// Requests `line_index` of the gpiochip at `chip_path` as an output, initially inactive.
    pub fn request(
        chip_path: impl AsRef<Path>,
        line_index: u32,
        active_level: GpioActiveLevel,
    ) -> DriverResult<Self> {
        let chip = gpiod::Chip::new(chip_path.as_ref())?;
        let line = chip.request_lines(
            gpiod::Options::output([line_index])
                .consumer(env!("CARGO_PKG_NAME"))
                .active(active_level.into())
                .values([false]),
        )?;
        debug!("Requested {}[{}] as output", chip.name(), line_index);
        Ok(GpiodOutput {
            chip_name: chip.name().to_string(),
            line_index,
            line,
        })
    }
}

impl Debug for GpiodOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpiodOutput({}[{}])", self.chip_name, self.line_index)
    }
}

impl GpioOutput for GpiodOutput {
    fn write(&self, value: bool) -> DriverResult<()> {
        self.line.set_values([value])?;
        Ok(())
    }
}
