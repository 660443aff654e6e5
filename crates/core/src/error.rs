use thiserror::Error;

use crate::protocol::Command;

/// Errors raised while building, writing or reading SysEx frames.
#[derive(Debug, Error)]
pub enum SysexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("board count {count} is out of range (1..={max})")]
    BoardCount { count: usize, max: usize },

    #[error("{field} value {value} is out of range (max {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("undefined button flag bits {0:#04x}")]
    InvalidFlags(u8),

    #[error("byte {value:#04x} at offset {offset} is not a 7-bit data byte")]
    NotSevenBit { offset: usize, value: u8 },

    #[error("framing error at offset {offset}: {reason}")]
    Framing { offset: usize, reason: &'static str },

    #[error("frame does not carry the device header")]
    HeaderMismatch,

    #[error("unknown command byte {0}")]
    UnknownCommand(u8),

    #[error("{command:?} payload should be {expected} bytes, got {actual}")]
    PayloadLength {
        command: Command,
        expected: usize,
        actual: usize,
    },

    #[error("frame is truncated")]
    Truncated,
}
