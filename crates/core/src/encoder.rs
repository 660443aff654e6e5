//! Encoder for the default button settings file.
//!
//! The default file is one `SetButtonData` frame per button, in ascending
//! index order, with no separators. Every button gets its index as CC number
//! on channel 0 with no flags; the LED colors alternate with the index parity.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::button::{ButtonColor, ButtonFlags, ButtonSetting, LedColor};
use crate::error::SysexError;
use crate::messages::SysexMessage;
use crate::protocol::{data_byte, BUTTONS_PER_BOARD, BUTTON_FRAME_LEN, DATA_MAX, SYSEX_HEADER};

/// Up/down colors for even buttons.
pub const EVEN_BUTTON_COLOR: ButtonColor = ButtonColor::new(LedColor::MAGENTA, LedColor::GREEN);

/// Up/down colors for odd buttons.
pub const ODD_BUTTON_COLOR: ButtonColor = ButtonColor::new(LedColor::RED, LedColor::BLUE);

/// Immutable protocol configuration handed to the encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexConfig {
    header: [u8; 7],
    num_boards: usize,
}

impl SysexConfig {
    /// Most boards whose button indices still fit in a 7-bit data byte.
    pub const MAX_BOARDS: usize = (DATA_MAX as usize + 1) / BUTTONS_PER_BOARD;

    pub fn new(num_boards: usize) -> Result<Self, SysexError> {
        if !(1..=Self::MAX_BOARDS).contains(&num_boards) {
            return Err(SysexError::BoardCount {
                count: num_boards,
                max: Self::MAX_BOARDS,
            });
        }
        Ok(Self {
            header: SYSEX_HEADER,
            num_boards,
        })
    }

    /// Replace the device header, e.g. for another product number.
    pub fn with_header(mut self, header: [u8; 7]) -> Result<Self, SysexError> {
        for byte in header {
            data_byte("header", byte)?;
        }
        self.header = header;
        Ok(self)
    }

    pub fn header(&self) -> &[u8; 7] {
        &self.header
    }

    pub fn num_boards(&self) -> usize {
        self.num_boards
    }

    pub fn button_count(&self) -> usize {
        self.num_boards * BUTTONS_PER_BOARD
    }

    /// Check that `index` names a button on the configured boards.
    pub fn button_index(&self, index: usize) -> Result<u8, SysexError> {
        if index >= self.button_count() {
            return Err(SysexError::FieldOutOfRange {
                field: "index",
                value: index,
                max: self.button_count() - 1,
            });
        }
        data_byte("index", index as u8)
    }
}

impl Default for SysexConfig {
    fn default() -> Self {
        Self {
            header: SYSEX_HEADER,
            num_boards: 1,
        }
    }
}

/// Factory settings for the button at `index`.
pub fn default_setting(index: u8) -> ButtonSetting {
    let color = if index % 2 == 0 {
        EVEN_BUTTON_COLOR
    } else {
        ODD_BUTTON_COLOR
    };

    ButtonSetting {
        index,
        channel: 0,
        cc: index,
        flags: ButtonFlags::NONE,
        color,
    }
}

/// Factory settings for every button on the configured boards.
pub fn default_settings(config: &SysexConfig) -> Result<Vec<ButtonSetting>, SysexError> {
    (0..config.button_count())
        .map(|index| config.button_index(index).map(default_setting))
        .collect()
}

/// Encode one `SetButtonData` frame.
pub fn encode_button(config: &SysexConfig, setting: &ButtonSetting) -> Result<Vec<u8>, SysexError> {
    SysexMessage::SetButtonData(*setting).encode(config)
}

/// Encode a `SetButtonData` frame per setting, in the order given.
pub fn encode_settings(
    config: &SysexConfig,
    settings: &[ButtonSetting],
) -> Result<Vec<u8>, SysexError> {
    let mut bytes = Vec::with_capacity(settings.len() * BUTTON_FRAME_LEN);
    for setting in settings {
        bytes.extend(encode_button(config, setting)?);
    }
    Ok(bytes)
}

/// Encode the default settings file contents.
pub fn encode_all(config: &SysexConfig) -> Result<Vec<u8>, SysexError> {
    encode_settings(config, &default_settings(config)?)
}

/// Write the default settings to `writer`, returning the number of bytes written.
///
/// Everything is encoded before the first write, so a range error leaves the
/// writer untouched.
pub fn write_all<W: Write>(config: &SysexConfig, mut writer: W) -> Result<usize, SysexError> {
    let bytes = encode_all(config)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Write the default settings file to `path`, truncating any existing file.
pub fn write_file(config: &SysexConfig, path: impl AsRef<Path>) -> Result<usize, SysexError> {
    let bytes = encode_all(config)?;
    save_frames(path, &bytes)
}

/// Write already encoded frames to `path`, truncating any existing file.
pub fn save_frames(path: impl AsRef<Path>, bytes: &[u8]) -> Result<usize, SysexError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()?;

    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}
