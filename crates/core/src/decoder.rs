//! Reading frames back out of a `.syx` byte stream.

use crate::button::ButtonSetting;
use crate::encoder::SysexConfig;
use crate::error::SysexError;
use crate::messages::SysexMessage;
use crate::protocol::{Command, DATA_MAX, SYSEX_BEGIN, SYSEX_END};

/// Split a byte stream into frames, each including its `F0`/`F7` delimiters.
///
/// Bytes outside a frame, a status byte inside one, or a missing end byte are
/// all framing errors.
pub fn split_frames(bytes: &[u8]) -> Result<Vec<&[u8]>, SysexError> {
    let mut frames = Vec::new();
    let mut start = None;

    for (offset, &byte) in bytes.iter().enumerate() {
        match (start, byte) {
            (None, SYSEX_BEGIN) => start = Some(offset),
            (None, _) => {
                return Err(SysexError::Framing {
                    offset,
                    reason: "expected start of SysEx",
                })
            }
            (Some(begin), SYSEX_END) => {
                frames.push(&bytes[begin..=offset]);
                start = None;
            }
            (Some(_), SYSEX_BEGIN) => {
                return Err(SysexError::Framing {
                    offset,
                    reason: "start of SysEx inside a frame",
                })
            }
            (Some(_), value) if value > DATA_MAX => {
                return Err(SysexError::NotSevenBit { offset, value });
            }
            (Some(_), _) => {}
        }
    }

    if start.is_some() {
        return Err(SysexError::Truncated);
    }
    Ok(frames)
}

/// Decode a single frame, delimiters included.
pub fn decode_frame(config: &SysexConfig, frame: &[u8]) -> Result<SysexMessage, SysexError> {
    let body = match frame {
        [SYSEX_BEGIN, body @ .., SYSEX_END] => body,
        [SYSEX_BEGIN, ..] | [] => return Err(SysexError::Truncated),
        _ => {
            return Err(SysexError::Framing {
                offset: 0,
                reason: "expected start of SysEx",
            })
        }
    };

    for (offset, &value) in body.iter().enumerate() {
        if value > DATA_MAX {
            return Err(SysexError::NotSevenBit {
                offset: offset + 1,
                value,
            });
        }
    }

    let header = config.header();
    if body.len() < header.len() {
        return Err(SysexError::Truncated);
    }
    let (found, rest) = body.split_at(header.len());
    if found != header {
        return Err(SysexError::HeaderMismatch);
    }

    let Some((&command, payload)) = rest.split_first() else {
        return Ok(SysexMessage::Ping);
    };
    let command = Command::try_from(command)?;
    if payload.len() != command.payload_len() {
        return Err(SysexError::PayloadLength {
            command,
            expected: command.payload_len(),
            actual: payload.len(),
        });
    }

    let message = match command {
        Command::GetVersion => SysexMessage::GetVersion,
        Command::GetButtonData => SysexMessage::GetButtonData {
            index: config.button_index(payload[0] as usize)?,
        },
        Command::SetButtonData => SysexMessage::SetButtonData(button_setting(config, payload)?),
        Command::RetVersion => SysexMessage::Version {
            version: payload[0],
        },
        Command::RetButtonData => SysexMessage::ButtonData(button_setting(config, payload)?),
    };
    Ok(message)
}

fn button_setting(config: &SysexConfig, payload: &[u8]) -> Result<ButtonSetting, SysexError> {
    let setting = ButtonSetting::from_payload(payload)?;
    setting.validate(config.button_count())?;
    Ok(setting)
}

/// Decode every frame in `bytes`, in stream order.
pub fn decode_all(config: &SysexConfig, bytes: &[u8]) -> Result<Vec<SysexMessage>, SysexError> {
    let messages = split_frames(bytes)?
        .into_iter()
        .map(|frame| decode_frame(config, frame))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Decoded {} messages from {} bytes", messages.len(), bytes.len());
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::{ButtonColor, ButtonFlags};
    use crate::encoder::{default_setting, encode_all};
    use crate::protocol::BUTTON_FRAME_LEN;

    #[test]
    fn test_default_file_round_trip() {
        let config = SysexConfig::default();
        let bytes = encode_all(&config).unwrap();

        let frames = split_frames(&bytes).unwrap();
        assert_eq!(frames.len(), 16);
        assert!(frames.iter().all(|f| f.len() == BUTTON_FRAME_LEN));

        let indices: Vec<u8> = frames.iter().map(|f| f[9]).collect();
        assert_eq!(indices, (0..16).collect::<Vec<u8>>());

        let messages = decode_all(&config, &bytes).unwrap();
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(
                *message,
                SysexMessage::SetButtonData(default_setting(i as u8))
            );
        }
    }

    #[test]
    fn test_ping_and_requests() {
        let config = SysexConfig::default();
        for message in [
            SysexMessage::Ping,
            SysexMessage::GetVersion,
            SysexMessage::GetButtonData { index: 9 },
            SysexMessage::Version { version: 1 },
        ] {
            let frame = message.encode(&config).unwrap();
            assert_eq!(decode_frame(&config, &frame).unwrap(), message);
        }
    }

    #[test]
    fn test_reply_button_data() {
        let config = SysexConfig::default();
        let setting = ButtonSetting {
            index: 4,
            channel: 9,
            cc: 100,
            flags: ButtonFlags::ALL,
            color: ButtonColor::from_byte(0x3F).unwrap(),
        };
        let frame = SysexMessage::ButtonData(setting).encode(&config).unwrap();
        assert_eq!(
            decode_frame(&config, &frame).unwrap(),
            SysexMessage::ButtonData(setting)
        );
    }

    #[test]
    fn test_framing_errors() {
        assert!(matches!(
            split_frames(&[0x00, 0xF0, 0xF7]),
            Err(SysexError::Framing { offset: 0, .. })
        ));
        assert!(matches!(
            split_frames(&[0xF0, 0x7D, 0xF0, 0xF7]),
            Err(SysexError::Framing { offset: 2, .. })
        ));
        assert!(matches!(
            split_frames(&[0xF0, 0x7D, 0x90, 0xF7]),
            Err(SysexError::NotSevenBit { offset: 2, value: 0x90 })
        ));
        assert!(matches!(
            split_frames(&[0xF0, 0x7D]),
            Err(SysexError::Truncated)
        ));
        assert!(split_frames(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_header_and_command_errors() {
        let config = SysexConfig::default();
        assert!(matches!(
            decode_frame(&config, &[0xF0, 125, 98, 117, 122, 122, 114, 2, 0, 0xF7]),
            Err(SysexError::HeaderMismatch)
        ));
        assert!(matches!(
            decode_frame(&config, &[0xF0, 125, 98, 117, 122, 122, 114, 1, 9, 0xF7]),
            Err(SysexError::UnknownCommand(9))
        ));
        assert!(matches!(
            decode_frame(&config, &[0xF0, 125, 98, 117, 122, 122, 114, 1, 2, 0, 0xF7]),
            Err(SysexError::PayloadLength {
                command: Command::SetButtonData,
                expected: 5,
                actual: 1
            })
        ));
        assert!(matches!(
            decode_frame(&config, &[0xF0, 125, 98, 0xF7]),
            Err(SysexError::Truncated)
        ));
    }

    #[test]
    fn test_button_index_beyond_boards() {
        let config = SysexConfig::default();
        let frame: [u8; 15] = [0xF0, 125, 98, 117, 122, 122, 114, 1, 2, 20, 0, 20, 0, 0, 0xF7];
        assert!(matches!(
            decode_frame(&config, &frame),
            Err(SysexError::FieldOutOfRange { field: "index", .. })
        ));

        let two_boards = SysexConfig::new(2).unwrap();
        assert!(decode_frame(&two_boards, &frame).is_ok());
    }

    #[test]
    fn test_request_index_beyond_boards() {
        let config = SysexConfig::default();
        let frame: [u8; 11] = [0xF0, 125, 98, 117, 122, 122, 114, 1, 1, 100, 0xF7];
        assert!(matches!(
            decode_frame(&config, &frame),
            Err(SysexError::FieldOutOfRange { field: "index", value: 100, .. })
        ));

        let last = [0xF0, 125, 98, 117, 122, 122, 114, 1, 1, 15, 0xF7];
        assert_eq!(
            decode_frame(&config, &last).unwrap(),
            SysexMessage::GetButtonData { index: 15 }
        );
    }
}
