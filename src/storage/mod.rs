//! Ring-buffer storage for averaged channel data.
//!
//! Raw samples flow through each field's inner [`Averager`](crate::Averager)
//! and one value per completed window is committed to the field's outer ring.
//! The [`DataFieldManager`] registers fields by channel number and the
//! [`SampleAccumulator`] fans samples out to the storage, upload and debug
//! managers.

pub mod accumulator;
pub mod field;
pub mod manager;
pub mod numeric;
mod ring;
pub mod text;

pub use accumulator::{AccumulatorEvent, SampleAccumulator};
pub use field::DataField;
pub use manager::{DataFieldManager, FieldSetup, NO_DATA_VALUE};
pub use numeric::NumericDataField;
pub use text::StringDataField;

/// Maximum number of fields a manager can register
pub const MAX_FIELDS: usize = 32;

/// Decimal places used when formatting numeric values
pub const DEFAULT_DECIMALS: usize = 4;

/// Physical quantity held by a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Voltage,
    Current,
    TemperatureC,
    TemperatureF,
    TemperatureK,
    Irradiance,
    CardinalDirection,
    DegreesDirection,
    GenericString,
    Invalid,
}

impl FieldType {
    /// Column header used in CSV output
    pub const fn label(self) -> &'static str {
        match self {
            Self::Voltage => "Voltage (V)",
            Self::Current => "Current (A)",
            Self::TemperatureC => "Temp (C)",
            Self::TemperatureF => "Temp (F)",
            Self::TemperatureK => "Temp (K)",
            Self::Irradiance => "Irradiance (W/m2)",
            Self::CardinalDirection | Self::DegreesDirection => "Wind Direction",
            Self::GenericString | Self::Invalid => "",
        }
    }

    /// Types that can be built from an analog channel's settings
    pub const fn is_analog_channel(self) -> bool {
        matches!(
            self,
            Self::Voltage
                | Self::Current
                | Self::TemperatureC
                | Self::TemperatureF
                | Self::TemperatureK
        )
    }

    pub const fn is_temperature(self) -> bool {
        matches!(
            self,
            Self::TemperatureC | Self::TemperatureF | Self::TemperatureK
        )
    }
}
