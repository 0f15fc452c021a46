//! In-memory output state for 8-line expanders and shift registers.
//!
//! Changes are computed here without touching the bus, so a caller can flip any number of lines
//! and push them to the chip in a single transfer.

use bitvec::prelude::*;
use std::fmt::{Debug, Formatter};

/// Number of output lines held by an [OutputBuffer].
pub const LINE_COUNT: usize = 8;

/// The pending output byte of an 8-line I2C output chip.
///
/// Each line has a polarity given by the mask passed at construction:
/// - a `1` bit means the line is driven high when set,
/// - a `0` bit means the line is driven low when set (active-low).
///
/// Line indices must be in `0..8`. Any other index panics.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct OutputBuffer {
    polarity: u8,
    bits: u8,
}

impl OutputBuffer {
    /// Polarity used when none is given: every line active-high.
    pub const DEFAULT_POLARITY: u8 = 0b11111111;

    /// Creates a buffer with all lines cleared.
    pub fn new(polarity: u8) -> Self {
        OutputBuffer {
            polarity,
            bits: polarity ^ 0b11111111,
        }
    }

    /// Gets the polarity mask.
    pub fn polarity(&self) -> u8 {
        self.polarity
    }

    /// Gets the byte that will be sent to the chip.
    pub fn value(&self) -> u8 {
        self.bits
    }

    /// Marks the line as active.
    pub fn set(&mut self, line: usize) {
        let level = Self::check_line(self.polarity.view_bits::<Lsb0>(), line);
        self.bits.view_bits_mut::<Lsb0>().set(line, level);
    }

    /// Marks the line as inactive.
    pub fn clear(&mut self, line: usize) {
        let level = Self::check_line(self.polarity.view_bits::<Lsb0>(), line);
        self.bits.view_bits_mut::<Lsb0>().set(line, !level);
    }

    /// Sets or clears the line depending on `state`.
    pub fn write(&mut self, line: usize, state: bool) {
        if state {
            self.set(line);
        } else {
            self.clear(line);
        }
    }

    /// Marks every line as active.
    pub fn set_buffer(&mut self) {
        self.bits = self.polarity;
    }

    /// Marks every line as inactive.
    pub fn clear_buffer(&mut self) {
        self.bits = self.polarity ^ 0b11111111;
    }

    /// Gets whether the line is currently marked active.
    pub fn is_set(&self, line: usize) -> bool {
        let level = Self::check_line(self.polarity.view_bits::<Lsb0>(), line);
        self.bits.view_bits::<Lsb0>()[line] == level
    }

    fn check_line(polarity: &BitSlice<u8, Lsb0>, line: usize) -> bool {
        assert!(line < LINE_COUNT, "output line {} out of range", line);
        polarity[line]
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        OutputBuffer::new(Self::DEFAULT_POLARITY)
    }
}

impl Debug for OutputBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "OutputBuffer({:08b}, polarity {:08b})", self.bits, self.polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_cleared() {
        assert_eq!(OutputBuffer::default().value(), 0b00000000);
        assert_eq!(OutputBuffer::new(0b00000000).value(), 0b11111111);
        assert_eq!(OutputBuffer::new(0b10100101).value(), 0b01011010);
    }

    #[test]
    fn set_follows_polarity() {
        let mut buffer = OutputBuffer::new(0b00001111);
        buffer.set(0);
        buffer.set(7);
        // line 0 active-high -> bit set, line 7 active-low -> bit cleared
        assert_eq!(buffer.value(), 0b01110001);
        assert!(buffer.is_set(0));
        assert!(buffer.is_set(7));
        assert!(!buffer.is_set(3));
    }

    #[test]
    fn bulk_operations_match_every_line() {
        for mask in 0..=u8::MAX {
            let mut bulk = OutputBuffer::new(mask);
            let mut each = OutputBuffer::new(mask);

            bulk.set_buffer();
            for line in 0..LINE_COUNT {
                each.set(line);
            }
            assert_eq!(bulk.value(), each.value(), "set, mask {:08b}", mask);
            assert_eq!(bulk.value(), mask);

            bulk.clear_buffer();
            for line in 0..LINE_COUNT {
                each.clear(line);
            }
            assert_eq!(bulk.value(), each.value(), "clear, mask {:08b}", mask);
            assert_eq!(bulk.value(), !mask);
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn line_out_of_range_panics() {
        OutputBuffer::default().set(8);
    }

    proptest! {
        #[test]
        fn set_then_clear_restores_the_bit(mask: u8, start: u8, line in 0..LINE_COUNT) {
            let mut buffer = OutputBuffer::new(mask);
            for i in 0..LINE_COUNT {
                buffer.write(i, start & (1 << i) != 0);
            }
            buffer.clear(line);
            let before = buffer.value();
            buffer.set(line);
            buffer.clear(line);
            prop_assert_eq!(buffer.value(), before);
        }

        #[test]
        fn clear_then_set_is_idempotent(mask: u8, line in 0..LINE_COUNT) {
            let mut buffer = OutputBuffer::new(mask);
            buffer.clear(line);
            buffer.set(line);
            let once = buffer.value();
            buffer.clear(line);
            buffer.set(line);
            buffer.set(line);
            prop_assert_eq!(buffer.value(), once);
        }

        #[test]
        fn write_dispatches_to_set_and_clear(mask: u8, line in 0..LINE_COUNT, state: bool) {
            let mut written = OutputBuffer::new(mask);
            let mut direct = OutputBuffer::new(mask);
            written.write(line, state);
            if state {
                direct.set(line);
            } else {
                direct.clear(line);
            }
            prop_assert_eq!(written, direct);
            prop_assert_eq!(written.is_set(line), state);
        }
    }
}
