//! Wire constants for the buzzr button board SysEx protocol.
//!
//! Every message is a SysEx frame:
//!
//! ```text
//! F0 | 7D 62 75 7A 7A 72 01 | <command> | <payload...> | F7
//!      ^^ ^^^^^^^^^^^^^^ ^^
//!      |  "buzzr"        product number
//!      educational/development manufacturer id
//! ```
//!
//! A frame carrying only the header is a ping; the board answers with the
//! header alone.

use crate::error::SysexError;

/// SysEx start byte.
pub const SYSEX_BEGIN: u8 = 0xF0;

/// SysEx end byte.
pub const SYSEX_END: u8 = 0xF7;

/// Manufacturer id reserved for educational or development use.
pub const EDU_MANUFACTURER_ID: u8 = 0x7D;

/// Device header that follows the start byte in every frame.
pub const SYSEX_HEADER: [u8; 7] = [EDU_MANUFACTURER_ID, 98, 117, 122, 122, 114, 1];

/// Length of the device header.
pub const HEADER_LEN: usize = SYSEX_HEADER.len();

/// Buttons on a single board.
pub const BUTTONS_PER_BOARD: usize = 16;

/// Largest value a SysEx data byte may carry.
pub const DATA_MAX: u8 = 0x7F;

/// Payload of a button data message: index, channel, cc, flags, color.
pub const BUTTON_DATA_LEN: usize = 5;

/// Bytes between the delimiters of a button data message.
pub const BUTTON_MESSAGE_BODY_LEN: usize = HEADER_LEN + 1 + BUTTON_DATA_LEN;

/// Full button data frame, delimiters included.
pub const BUTTON_FRAME_LEN: usize = BUTTON_MESSAGE_BODY_LEN + 2;

/// File name the default settings are written to.
pub const DEFAULT_SYSEX_FILE: &str = "default.syx";

/// Command byte following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    GetVersion = 0,
    GetButtonData = 1,
    SetButtonData = 2,
    RetVersion = 3,
    RetButtonData = 4,
}

impl Command {
    /// Number of payload bytes the command carries after the command byte.
    pub const fn payload_len(self) -> usize {
        match self {
            Command::GetVersion => 0,
            Command::GetButtonData => 1,
            Command::SetButtonData => BUTTON_DATA_LEN,
            Command::RetVersion => 1,
            Command::RetButtonData => BUTTON_DATA_LEN,
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = SysexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Command::GetVersion),
            1 => Ok(Command::GetButtonData),
            2 => Ok(Command::SetButtonData),
            3 => Ok(Command::RetVersion),
            4 => Ok(Command::RetButtonData),
            other => Err(SysexError::UnknownCommand(other)),
        }
    }
}

/// Check that `value` fits in a SysEx data byte.
pub(crate) fn data_byte(field: &'static str, value: u8) -> Result<u8, SysexError> {
    if value > DATA_MAX {
        return Err(SysexError::FieldOutOfRange {
            field,
            value: value as usize,
            max: DATA_MAX as usize,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_spells_device_name() {
        assert_eq!(&SYSEX_HEADER[1..6], b"buzzr");
        assert_eq!(SYSEX_HEADER[0], 125);
        assert_eq!(SYSEX_HEADER[6], 1);
    }

    #[test]
    fn test_button_frame_lengths() {
        assert_eq!(BUTTON_MESSAGE_BODY_LEN, 13);
        assert_eq!(BUTTON_FRAME_LEN, 15);
    }

    #[test]
    fn test_command_codes() {
        assert_eq!(u8::from(Command::SetButtonData), 2);
        assert_eq!(Command::try_from(4).unwrap(), Command::RetButtonData);
        assert!(matches!(
            Command::try_from(5),
            Err(SysexError::UnknownCommand(5))
        ));
    }

    #[test]
    fn test_data_byte_rejects_high_bit() {
        assert_eq!(data_byte("index", 127).unwrap(), 127);
        assert!(data_byte("index", 128).is_err());
    }
}
