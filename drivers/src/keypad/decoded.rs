//! Keypad behind a 74C922 keypad decoder, serialised by a PCF8574 I2C bus expander.
//!
//! The expander's low five lines carry the decoder outputs: the 4-bit key code on P0..P3 and
//! the "data available" flag on P4. The upper three lines are free and can drive auxiliary
//! outputs such as indicator LEDs, see [DecodedKeypad::outputs_mut].
//!
//! The bus must be ready before [DecodedKeypad::init] is called.

use crate::buffer::OutputBuffer;
use crate::buzzer::Buzzer;
use crate::i2c::I2cByteExt;
use crate::keypad::{Keypad, KeypadKey};
use crate::{DriverResult, GpioOutput};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::{debug, trace, warn};
use std::fmt::{Debug, Formatter};

/// Address of the expander with A0..A2 tied high.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x4 << 3 | 0x7;

/// Written on init, releasing the decoder lines so they can be read.
pub const INIT_BYTE: u8 = 0x1F;

/// Decoder "data available" flag, set while a key is held.
pub const DATA_AVAILABLE: u8 = 0x10;

/// Decoder key code bits.
pub const CODE_MASK: u8 = 0x0F;

/// Lines kept high on every auxiliary write so the decoder can still drive them.
pub const RESERVED_LINES: u8 = 0b00011111;

/// Key code of the confirm key, acknowledged with a double beep.
pub const CONFIRM_CODE: u8 = 14;

/// Edge detector state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DecoderState {
    /// No key latched.
    #[default]
    Idle,
    /// A key is down, waiting for its release.
    Armed,
}

pub struct DecodedKeypad<'a, I2C, D> {
    i2c: I2C,
    address: SevenBitAddress,
    state: DecoderState,
    raw_key: u8,
    buzzer: Buzzer<'a, D>,
    outputs: OutputBuffer,
}

impl<'a, I2C: I2c, D: DelayNs> DecodedKeypad<'a, I2C, D> {
    /// Creates a new `DecodedKeypad` with every auxiliary line active-high.
    ///
    /// `buzzer` is an already configured output for a piezo buzzer, if one is fitted.
    pub fn new(
        i2c: I2C,
        address: SevenBitAddress,
        buzzer: Option<&'a dyn GpioOutput>,
        delay: D,
    ) -> Self {
        Self::with_polarity(i2c, address, OutputBuffer::DEFAULT_POLARITY, buzzer, delay)
    }

    /// Creates a new `DecodedKeypad` with the given polarity mask for the auxiliary lines.
    pub fn with_polarity(
        i2c: I2C,
        address: SevenBitAddress,
        polarity: u8,
        buzzer: Option<&'a dyn GpioOutput>,
        delay: D,
    ) -> Self {
        DecodedKeypad {
            i2c,
            address,
            state: DecoderState::Idle,
            raw_key: 0,
            buzzer: Buzzer::new(buzzer, delay),
            outputs: OutputBuffer::new(polarity),
        }
    }

    /// Prepares the expander for reading and puts the buzzer line in its idle level.
    pub fn init(&mut self) -> DriverResult<()> {
        debug!("Initializing keypad at 0x{:02x}", self.address);
        self.i2c.send_byte(self.address, INIT_BYTE)?;
        self.buzzer.idle()
    }

    /// Samples the decoder once.
    ///
    /// Returns the key when a press has just been released. Holding a key returns `None` until
    /// it is let go. Every completed keystroke is acknowledged with a beep. A failing buzzer is
    /// logged and never costs the keystroke.
    pub fn poll_key_stroke(&mut self) -> DriverResult<Option<KeypadKey>> {
        let raw = self.i2c.receive_byte(self.address)?;
        self.raw_key = raw;

        let available = raw & DATA_AVAILABLE != 0;

        if self.state == DecoderState::Armed && !available {
            let code = raw & CODE_MASK;
            self.state = DecoderState::Idle;
            let key = KeypadKey::from_code(code);
            debug!("Key released: {:?} (code {})", key, code);

            let feedback = if code == CONFIRM_CODE {
                self.buzzer.beep(25, 25, 2)
            } else {
                self.buzzer.beep(25, 0, 1)
            };
            if let Err(err) = feedback {
                warn!("Key feedback beep failed: {}", err);
            }
            return Ok(Some(key));
        }

        if available {
            if self.state == DecoderState::Idle {
                trace!("Key down, raw {:08b}", raw);
            }
            self.state = DecoderState::Armed;
        }

        Ok(None)
    }

    /// Gets the last byte read from the expander.
    pub fn raw_key(&self) -> u8 {
        self.raw_key
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// See [Buzzer::beep].
    pub fn beep(&mut self, on_ms: u32, off_ms: u32, repetitions: u32) -> DriverResult<()> {
        self.buzzer.beep(on_ms, off_ms, repetitions)
    }

    pub fn beep_on(&mut self) {
        self.buzzer.enable();
    }

    pub fn beep_off(&mut self) {
        self.buzzer.disable();
    }

    pub fn is_beep_enabled(&self) -> bool {
        self.buzzer.is_enabled()
    }

    /// Gets the auxiliary output buffer.
    pub fn outputs(&self) -> &OutputBuffer {
        &self.outputs
    }

    /// Gets the auxiliary output buffer for modification. Changes are sent by
    /// [Self::write_buffer].
    pub fn outputs_mut(&mut self) -> &mut OutputBuffer {
        &mut self.outputs
    }

    pub fn set(&mut self, line: usize) {
        self.outputs.set(line);
    }

    pub fn clear(&mut self, line: usize) {
        self.outputs.clear(line);
    }

    pub fn write(&mut self, line: usize, state: bool) {
        self.outputs.write(line, state);
    }

    pub fn set_buffer(&mut self) {
        self.outputs.set_buffer();
    }

    pub fn clear_buffer(&mut self) {
        self.outputs.clear_buffer();
    }

    /// Sends the auxiliary outputs to the expander, with the decoder lines forced high.
    pub fn write_buffer(&mut self) -> DriverResult<()> {
        let value = self.outputs.value() | RESERVED_LINES;
        self.i2c.send_byte(self.address, value).inspect_err(|err| {
            warn!("Writing keypad outputs to 0x{:02x} failed: {}", self.address, err);
        })
    }

    /// Releases the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, D> Debug for DecodedKeypad<'_, I2C, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecodedKeypad(0x{:02x}, {:?}, {:?})",
            self.address, self.state, self.buzzer
        )
    }
}

impl<I2C: I2c, D: DelayNs> Keypad for DecodedKeypad<'_, I2C, D> {
    type Key = KeypadKey;

    fn read(&mut self) -> DriverResult<Option<Self::Key>> {
        self.poll_key_stroke()
    }
}
