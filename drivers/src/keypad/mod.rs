mod decoded;

use crate::DriverResult;
pub use decoded::*;
use std::fmt::Debug;

/// The `Keypad` trait defines the interface for polled keypad input devices.
pub trait Keypad: Debug {
    type Key;

    /// Polls the keypad once, returning a key if a keystroke completed since the last poll.
    fn read(&mut self) -> DriverResult<Option<Self::Key>>;
}

/// Characters printed on a 4x4 keypad, indexed by the 4-bit code of a 74C922 decoder.
pub const CHAR_SET: [char; 16] = [
    '1', '2', '3', 'A',
    '4', '5', '6', 'B',
    '7', '8', '9', 'C',
    '*', '0', '#', 'D',
];

/// Represents the keys on a 4x4 keypad.
///
/// Discriminants are the decoder key codes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum KeypadKey {
    /// The `1` key.
    Key1 = 0,
    /// The `2` key.
    Key2 = 1,
    /// The `3` key.
    Key3 = 2,
    /// The `A` key.
    KeyA = 3,
    /// The `4` key.
    Key4 = 4,
    /// The `5` key.
    Key5 = 5,
    /// The `6` key.
    Key6 = 6,
    /// The `B` key.
    KeyB = 7,
    /// The `7` key.
    Key7 = 8,
    /// The `8` key.
    Key8 = 9,
    /// The `9` key.
    Key9 = 10,
    /// The `C` key.
    KeyC = 11,
    /// The `*` key.
    KeyAsterisk = 12,
    /// The `0` key.
    Key0 = 13,
    /// The `#` key.
    KeyHash = 14,
    /// The `D` key.
    KeyD = 15,
}

impl KeypadKey {
    /// Converts a decoder key code to a [KeypadKey]. Only the low nibble is used.
    pub fn from_code(code: u8) -> KeypadKey {
        use KeypadKey::*;

        const KEYS: [KeypadKey; 16] = [
            Key1, Key2, Key3, KeyA,
            Key4, Key5, Key6, KeyB,
            Key7, Key8, Key9, KeyC,
            KeyAsterisk, Key0, KeyHash, KeyD,
        ];

        KEYS[(code & 0x0F) as usize]
    }

    /// Gets the decoder key code of the [KeypadKey].
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Converts the [KeypadKey] to its corresponding character.
    pub fn to_char(self) -> char {
        CHAR_SET[self.code() as usize]
    }
}

impl From<KeypadKey> for char {
    fn from(key: KeypadKey) -> Self {
        key.to_char()
    }
}
