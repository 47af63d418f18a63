//! Hardware-independent core library for the CREST datalogger
//!
//! This crate contains the sample averaging and ring-buffer storage engine
//! that sits between the ADC and the SD-card/upload layers: the `Averager`
//! sliding-window accumulator, the numeric and string data fields, the
//! channel registry that coordinates them, and the channel settings and
//! conversion maths they depend on.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).
//! Buffers are allocated once during setup and never resized while sampling.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod averager;
pub mod config;
pub mod conversion;
pub mod error;
pub mod fixed_buffer;
pub mod sensors;
pub mod settings;
pub mod storage;

pub use averager::{Averager, Sample};
pub use config::DataConfig;
pub use conversion::{ConversionParams, CurrentChannel, ThermistorChannel, VoltageChannel};
pub use error::DataError;
pub use settings::{ChannelSettings, DataChannelSettings};
pub use storage::{
    DataField, DataFieldManager, FieldType, MAX_FIELDS, NumericDataField, SampleAccumulator,
    StringDataField,
};
