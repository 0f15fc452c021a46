use dotenv::dotenv;
use log::{debug, info, warn};
use pcfkey_drivers::delay::StdDelay;
use pcfkey_drivers::gpiod::GpiodOutput;
use pcfkey_drivers::keypad::{DEFAULT_ADDRESS, DecodedKeypad, DecoderState, Keypad, KeypadKey};
use pcfkey_drivers::shiftreg::BufferedShiftRegister;
use pcfkey_drivers::{GpioActiveLevel, GpioOutput};
use rppal::i2c::I2c;
use std::env::var;
use std::thread::sleep;
use std::time::Duration;

/// Auxiliary line on the keypad expander wired to a "key held" LED.
const LED_LINE: usize = 7;

fn parse_address(str: &str) -> eyre::Result<u8> {
    let str = str.trim();
    let address = match str.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => str.parse()?,
    };
    if address > 0x7F {
        return Err(eyre::eyre!("I2C address {} is not 7-bit", str));
    }
    Ok(address)
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    let bus: u8 = var("PCFKEY_I2C_BUS").map_or(Ok(1), |s| s.parse())?;
    let keypad_address = match var("PCFKEY_KEYPAD_ADDR") {
        Ok(s) => parse_address(&s)?,
        Err(_) => DEFAULT_ADDRESS,
    };
    let shiftreg_address = parse_address(&var("PCFKEY_SHIFTREG_ADDR")?)?;

    info!(
        "Keypad @ i2c-{} 0x{:02x}, shift register @ 0x{:02x}",
        bus, keypad_address, shiftreg_address
    );

    let buzzer = match (var("PCFKEY_BUZZER_CHIP"), var("PCFKEY_BUZZER_LINE")) {
        (Ok(chip), Ok(line)) => Some(GpiodOutput::request(chip, line.parse()?, GpioActiveLevel::High)?),
        _ => {
            info!("No buzzer configured");
            None
        }
    };
    debug!("Buzzer: {:?}", buzzer);

    let mut keypad = DecodedKeypad::new(
        I2c::with_bus(bus)?,
        keypad_address,
        buzzer.as_ref().map(|b| b as &dyn GpioOutput),
        StdDelay,
    );
    keypad.init()?;

    let mut shiftreg = BufferedShiftRegister::new(I2c::with_bus(bus)?, shiftreg_address);
    shiftreg.clear_buffer();
    if let Err(err) = shiftreg.write_buffer() {
        warn!("Shift register not responding: {}", err);
    }

    info!("Polling keypad...");

    let mut held = false;

    loop {
        let key = keypad.read()?;

        let armed = keypad.state() == DecoderState::Armed;
        if armed != held {
            held = armed;
            keypad.write(LED_LINE, held);
            if let Err(err) = keypad.write_buffer() {
                warn!("Keypad LED not updated: {}", err);
            }
        }

        if let Some(key) = key {
            info!("Key {} (raw {:08b})", key.to_char(), keypad.raw_key());

            match key {
                KeypadKey::KeyD => {
                    if keypad.is_beep_enabled() {
                        keypad.beep_off();
                    } else {
                        keypad.beep_on();
                    }
                    info!("Beep {}", if keypad.is_beep_enabled() { "on" } else { "off" });
                }
                KeypadKey::KeyC => shiftreg.clear_buffer(),
                _ => {
                    // show the key code on the register, one line per bit
                    let code = key.code();
                    for line in 0..4 {
                        shiftreg.write(line, code & (1 << line) != 0);
                    }
                }
            }

            if let Err(err) = shiftreg.write_buffer() {
                warn!("Shift register not responding: {}", err);
            }
        }

        sleep(Duration::from_millis(10));
    }
}
