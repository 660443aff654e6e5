//! Encoder for the buzzr button board's SysEx settings files.
//!
//! The board keeps a MIDI channel, CC number, behaviour flags and LED colors
//! for each of its buttons. Settings are sent as SysEx frames; the factory
//! defaults live in a `default.syx` file built by [`encode_all`].

pub use button::{ButtonColor, ButtonFlags, ButtonSetting, LedColor};
pub use config::{ButtonOverride, ConfigError, ConfigManager, GeneratorSettings};
pub use decoder::{decode_all, decode_frame, split_frames};
pub use encoder::{
    default_setting, default_settings, encode_all, encode_button, encode_settings, save_frames,
    write_all, write_file, SysexConfig, EVEN_BUTTON_COLOR, ODD_BUTTON_COLOR,
};
pub use error::SysexError;
pub use messages::{request_all_button_data, SysexMessage};

mod button;
mod config;
mod decoder;
mod encoder;
mod error;
pub mod messages;
pub mod protocol;
