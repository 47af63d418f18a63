//! Error types for the datalogger core

use thiserror_no_std::Error;

/// Errors raised by the averaging and storage engine.
///
/// Configuration errors (`RegistryFull`, `InvalidConfiguration`) are raised
/// during setup and are fatal to the application. Read errors are returned to
/// the caller; the sampling path itself never fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataError {
    #[error("Field registry is full ({capacity} fields)")]
    RegistryFull { capacity: usize },
    #[error("Index {index} out of range ({len} values stored)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Output buffer is full")]
    BufferFull,
}

impl From<core::fmt::Error> for DataError {
    fn from(_: core::fmt::Error) -> Self {
        DataError::BufferFull
    }
}

/// Result of parsing a single `ChannelN.setting = value` line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSettingError {
    #[error("Setting has no '='")]
    NoEquals,
    #[error("Setting has no valid channel number")]
    NoChannel,
    #[error("Setting has no channel setting name")]
    NoSetting,
    #[error("Unknown channel type")]
    UnknownType,
    #[error("Unknown setting for this channel type")]
    UnknownSetting,
    #[error("Setting value could not be parsed")]
    InvalidSetting,
    #[error("Channel type must be set before other settings")]
    ChannelTypeNotSet,
}
