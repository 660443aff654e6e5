//! Button settings stored on the board.
//!
//! Each button carries a MIDI channel and CC number, behaviour flags and a
//! pair of LED colors. The color byte packs both LED states as
//! `00 rbg rbg`: the upper triple is shown while the button is up, the lower
//! triple while it is held down.

use crate::error::SysexError;
use crate::protocol::data_byte;

/// Three-bit RGB LED color, laid out as `rbg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LedColor(u8);

impl LedColor {
    pub const OFF: LedColor = LedColor(0);
    pub const GREEN: LedColor = LedColor(1 << 0);
    pub const BLUE: LedColor = LedColor(1 << 1);
    pub const RED: LedColor = LedColor(1 << 2);
    pub const CYAN: LedColor = LedColor(Self::GREEN.0 | Self::BLUE.0);
    pub const YELLOW: LedColor = LedColor(Self::RED.0 | Self::GREEN.0);
    pub const MAGENTA: LedColor = LedColor(Self::RED.0 | Self::BLUE.0);
    pub const WHITE: LedColor = LedColor(Self::RED.0 | Self::BLUE.0 | Self::GREEN.0);

    /// Mask covering the three color bits.
    pub const MASK: u8 = 0b111;

    /// Build a color from its `rbg` bits.
    pub fn from_bits(bits: u8) -> Result<Self, SysexError> {
        if bits & !Self::MASK != 0 {
            return Err(SysexError::FieldOutOfRange {
                field: "led color",
                value: bits as usize,
                max: Self::MASK as usize,
            });
        }
        Ok(LedColor(bits))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: LedColor) -> LedColor {
        LedColor(self.0 | other.0)
    }

    pub const fn red(self) -> bool {
        self.0 & Self::RED.0 != 0
    }

    pub const fn blue(self) -> bool {
        self.0 & Self::BLUE.0 != 0
    }

    pub const fn green(self) -> bool {
        self.0 & Self::GREEN.0 != 0
    }
}

/// LED colors for both button states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonColor {
    /// Shown while the button is released
    pub up: LedColor,
    /// Shown while the button is pressed
    pub down: LedColor,
}

impl ButtonColor {
    /// Largest valid packed color byte.
    pub const MAX: u8 = 0x3F;

    pub const fn new(up: LedColor, down: LedColor) -> Self {
        Self { up, down }
    }

    /// Pack into the `00 rbg rbg` wire byte.
    pub const fn to_byte(self) -> u8 {
        (self.up.bits() << 3) | self.down.bits()
    }

    /// Unpack a wire byte, rejecting anything above six bits.
    pub fn from_byte(byte: u8) -> Result<Self, SysexError> {
        if byte > Self::MAX {
            return Err(SysexError::FieldOutOfRange {
                field: "color",
                value: byte as usize,
                max: Self::MAX as usize,
            });
        }
        Ok(Self {
            up: LedColor((byte >> 3) & LedColor::MASK),
            down: LedColor(byte & LedColor::MASK),
        })
    }
}

/// Behaviour flags for a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonFlags(u8);

impl ButtonFlags {
    pub const NONE: ButtonFlags = ButtonFlags(0);
    /// LEDs follow incoming CC values instead of the button state.
    pub const LED_MIDI_DRIVEN: ButtonFlags = ButtonFlags(0x1);
    /// Button toggles; otherwise it is momentary.
    pub const TOGGLE: ButtonFlags = ButtonFlags(0x2);

    /// Every flag the firmware understands.
    pub const ALL: ButtonFlags = ButtonFlags(Self::LED_MIDI_DRIVEN.0 | Self::TOGGLE.0);

    pub fn from_bits(bits: u8) -> Result<Self, SysexError> {
        if bits & !Self::ALL.0 != 0 {
            return Err(SysexError::InvalidFlags(bits));
        }
        Ok(ButtonFlags(bits))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: ButtonFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: ButtonFlags) -> ButtonFlags {
        ButtonFlags(self.0 | other.0)
    }
}

/// Settings for one button, as carried by a button data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSetting {
    /// Button index across all boards
    pub index: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// CC number (0-127)
    pub cc: u8,
    pub flags: ButtonFlags,
    pub color: ButtonColor,
}

impl ButtonSetting {
    /// Highest MIDI channel number (zero based).
    pub const CHANNEL_MAX: u8 = 0x0F;

    /// Check every field against its wire range and the number of buttons
    /// the target boards have.
    pub fn validate(&self, button_count: usize) -> Result<(), SysexError> {
        data_byte("index", self.index)?;
        if self.index as usize >= button_count {
            return Err(SysexError::FieldOutOfRange {
                field: "index",
                value: self.index as usize,
                max: button_count.saturating_sub(1),
            });
        }
        if self.channel > Self::CHANNEL_MAX {
            return Err(SysexError::FieldOutOfRange {
                field: "channel",
                value: self.channel as usize,
                max: Self::CHANNEL_MAX as usize,
            });
        }
        data_byte("cc", self.cc)?;
        Ok(())
    }

    /// Payload bytes in wire order: index, channel, cc, flags, color.
    pub const fn payload(&self) -> [u8; 5] {
        [
            self.index,
            self.channel,
            self.cc,
            self.flags.bits(),
            self.color.to_byte(),
        ]
    }

    /// Parse the five payload bytes, checking each field.
    pub fn from_payload(payload: &[u8]) -> Result<Self, SysexError> {
        let [index, channel, cc, flags, color] = payload else {
            return Err(SysexError::Truncated);
        };
        let setting = Self {
            index: data_byte("index", *index)?,
            channel: *channel,
            cc: data_byte("cc", *cc)?,
            flags: ButtonFlags::from_bits(*flags)?,
            color: ButtonColor::from_byte(*color)?,
        };
        if setting.channel > Self::CHANNEL_MAX {
            return Err(SysexError::FieldOutOfRange {
                field: "channel",
                value: setting.channel as usize,
                max: Self::CHANNEL_MAX as usize,
            });
        }
        Ok(setting)
    }
}
