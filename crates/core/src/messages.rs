//! Messages exchanged with the board.

use crate::button::ButtonSetting;
use crate::encoder::SysexConfig;
use crate::error::SysexError;
use crate::protocol::{data_byte, Command, SYSEX_BEGIN, SYSEX_END};

/// A single SysEx message understood by the board.
///
/// `Version` and `ButtonData` are replies sent by the board; the rest are
/// host requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysexMessage {
    /// Header only; the board answers with the same frame.
    Ping,
    GetVersion,
    GetButtonData { index: u8 },
    SetButtonData(ButtonSetting),
    Version { version: u8 },
    ButtonData(ButtonSetting),
}

impl SysexMessage {
    pub fn command(&self) -> Option<Command> {
        match self {
            SysexMessage::Ping => None,
            SysexMessage::GetVersion => Some(Command::GetVersion),
            SysexMessage::GetButtonData { .. } => Some(Command::GetButtonData),
            SysexMessage::SetButtonData(_) => Some(Command::SetButtonData),
            SysexMessage::Version { .. } => Some(Command::RetVersion),
            SysexMessage::ButtonData(_) => Some(Command::RetButtonData),
        }
    }

    /// Encode the full frame, delimiters included.
    pub fn encode(&self, config: &SysexConfig) -> Result<Vec<u8>, SysexError> {
        let mut frame = Vec::with_capacity(self.frame_len(config));
        frame.push(SYSEX_BEGIN);
        frame.extend_from_slice(config.header());

        if let Some(command) = self.command() {
            frame.push(command.into());
        }

        match self {
            SysexMessage::Ping | SysexMessage::GetVersion => {}
            SysexMessage::GetButtonData { index } => {
                frame.push(config.button_index(*index as usize)?);
            }
            SysexMessage::SetButtonData(setting) | SysexMessage::ButtonData(setting) => {
                setting.validate(config.button_count())?;
                frame.extend_from_slice(&setting.payload());
            }
            SysexMessage::Version { version } => {
                frame.push(data_byte("version", *version)?);
            }
        }

        frame.push(SYSEX_END);
        Ok(frame)
    }

    fn frame_len(&self, config: &SysexConfig) -> usize {
        let body = match self.command() {
            Some(command) => 1 + command.payload_len(),
            None => 0,
        };
        config.header().len() + body + 2
    }
}

/// One `GetButtonData` frame for every button, in index order.
pub fn request_all_button_data(config: &SysexConfig) -> Result<Vec<u8>, SysexError> {
    let mut bytes = Vec::new();
    for index in 0..config.button_count() {
        let index = config.button_index(index)?;
        bytes.extend(SysexMessage::GetButtonData { index }.encode(config)?);
    }
    log::debug!(
        "Built {} button data requests ({} bytes)",
        config.button_count(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::{ButtonColor, ButtonFlags, LedColor};
    use crate::protocol::SYSEX_HEADER;

    fn framed(body: &[u8]) -> Vec<u8> {
        let mut frame = vec![SYSEX_BEGIN];
        frame.extend_from_slice(&SYSEX_HEADER);
        frame.extend_from_slice(body);
        frame.push(SYSEX_END);
        frame
    }

    #[test]
    fn test_ping_is_header_only() {
        let config = SysexConfig::default();
        assert_eq!(SysexMessage::Ping.encode(&config).unwrap(), framed(&[]));
    }

    #[test]
    fn test_request_frames() {
        let config = SysexConfig::default();
        assert_eq!(
            SysexMessage::GetVersion.encode(&config).unwrap(),
            framed(&[0])
        );
        assert_eq!(
            SysexMessage::GetButtonData { index: 5 }
                .encode(&config)
                .unwrap(),
            framed(&[1, 5])
        );
    }

    #[test]
    fn test_replies_encode() {
        let config = SysexConfig::default();
        let setting = ButtonSetting {
            index: 2,
            channel: 1,
            cc: 20,
            flags: ButtonFlags::TOGGLE,
            color: ButtonColor::new(LedColor::WHITE, LedColor::RED),
        };
        assert_eq!(
            SysexMessage::ButtonData(setting).encode(&config).unwrap(),
            framed(&[4, 2, 1, 20, 2, 0b111_100])
        );
        assert_eq!(
            SysexMessage::Version { version: 1 }.encode(&config).unwrap(),
            framed(&[3, 1])
        );
    }

    #[test]
    fn test_set_button_data_checks_index_against_boards() {
        let config = SysexConfig::default();
        let setting = ButtonSetting {
            index: 16,
            channel: 0,
            cc: 16,
            flags: ButtonFlags::NONE,
            color: ButtonColor::default(),
        };
        assert!(SysexMessage::SetButtonData(setting).encode(&config).is_err());
    }

    #[test]
    fn test_get_button_data_checks_index_against_boards() {
        let config = SysexConfig::default();
        assert!(matches!(
            SysexMessage::GetButtonData { index: 100 }.encode(&config),
            Err(SysexError::FieldOutOfRange { field: "index", value: 100, .. })
        ));
        assert!(SysexMessage::GetButtonData { index: 16 }
            .encode(&config)
            .is_err());

        let two_boards = SysexConfig::new(2).unwrap();
        assert!(SysexMessage::GetButtonData { index: 16 }
            .encode(&two_boards)
            .is_ok());
    }

    #[test]
    fn test_request_all_button_data() {
        let config = SysexConfig::new(2).unwrap();
        let bytes = request_all_button_data(&config).unwrap();
        let frame_len = SYSEX_HEADER.len() + 4;
        assert_eq!(bytes.len(), 32 * frame_len);

        for (i, frame) in bytes.chunks(frame_len).enumerate() {
            assert_eq!(frame[SYSEX_HEADER.len() + 1], 1);
            assert_eq!(frame[SYSEX_HEADER.len() + 2] as usize, i);
        }
    }
}
