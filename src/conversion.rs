//! Conversion of averaged ADC readings into engineering units.
//!
//! Each numeric channel carries the component values needed to convert its
//! raw readings. The parameters are a tagged variant so a field can never be
//! converted with another channel type's constants.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::sensors::{Thermistor, divider};
use crate::storage::{FieldType, NumericDataField};

/// Potential-divider voltage input.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VoltageChannel {
    pub mv_per_bit: f32,
    pub r1: f32,
    pub r2: f32,
    /// Subtracted from the ADC voltage (V) before scaling.
    pub offset: f32,
    pub multiplier: f32,
}

impl VoltageChannel {
    pub const fn new(mv_per_bit: f32, r1: f32, r2: f32) -> Self {
        Self {
            mv_per_bit,
            r1,
            r2,
            offset: 0.0,
            multiplier: 1.0,
        }
    }
}

impl Default for VoltageChannel {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Hall-effect style current sensor with a zero-current offset.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrentChannel {
    pub mv_per_bit: f32,
    /// Sensor output in mV at 0 A.
    pub offset: f32,
    pub mv_per_amp: f32,
}

/// Thermistor in a divider with a fixed resistor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ThermistorChannel {
    pub r25: f32,
    pub b: f32,
    pub other_r: f32,
    pub max_adc: f32,
    pub highside: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum ConversionParams {
    Voltage(VoltageChannel),
    Current(CurrentChannel),
    Thermistor(ThermistorChannel),
}

/// Per-field override of the type-based conversion.
pub type AltConversion = fn(f32, &ConversionParams) -> f32;

fn adc_to_mv(raw: f32, mv_per_bit: f32) -> f32 {
    raw * mv_per_bit
}

pub fn volts_from_raw(raw: f32, channel: &VoltageChannel) -> f32 {
    let volts = adc_to_mv(raw, channel.mv_per_bit) / 1000.0;
    let scaled = (volts - channel.offset) * channel.multiplier;
    divider::input_voltage(scaled, channel.r1, channel.r2)
}

pub fn amps_from_raw(raw: f32, channel: &CurrentChannel) -> f32 {
    let mv = adc_to_mv(raw, channel.mv_per_bit);
    (mv - channel.offset) / channel.mv_per_amp
}

pub fn celsius_from_raw_thermistor(raw: f32, channel: &ThermistorChannel) -> f32 {
    let thermistor = Thermistor::new(channel.b, channel.r25, channel.highside);
    thermistor.temperature_from_adc_reading(channel.other_r, raw, channel.max_adc)
}

/// Convert `raw` according to the field type.
///
/// Types without a matching parameter set pass through unchanged.
pub fn convert(field_type: FieldType, raw: f32, params: &ConversionParams) -> f32 {
    match (field_type, params) {
        (FieldType::Voltage, ConversionParams::Voltage(channel)) => volts_from_raw(raw, channel),
        (FieldType::Current, ConversionParams::Current(channel)) => amps_from_raw(raw, channel),
        (FieldType::TemperatureC, ConversionParams::Thermistor(channel)) => {
            celsius_from_raw_thermistor(raw, channel)
        }
        (FieldType::TemperatureF, ConversionParams::Thermistor(channel)) => {
            celsius_from_raw_thermistor(raw, channel) * 9.0 / 5.0 + 32.0
        }
        (FieldType::TemperatureK, ConversionParams::Thermistor(channel)) => {
            celsius_from_raw_thermistor(raw, channel) + 273.15
        }
        _ => raw,
    }
}

/// Channels above this number sit behind the 33k+33k input divider.
const LINKIT_ONE_DIVIDED_CHANNELS_START: u32 = 13;
const LINKIT_ONE_MV_PER_BIT: f32 = 5000.0 / 1024.0;
const LINKIT_ONE_DIVIDER_SUPPLY_MV: f32 = 3300.0;
const LINKIT_ONE_PARALLEL_R: f32 = 66000.0;

/// Thermistor conversion compensating for the 66k input divider in parallel
/// with the thermistor.
fn linkit_one_thermistor_conversion(raw: f32, params: &ConversionParams) -> f32 {
    let ConversionParams::Thermistor(channel) = params else {
        return raw;
    };

    let mv = adc_to_mv(raw, LINKIT_ONE_MV_PER_BIT);
    let parallel_r = divider::lower_resistance(channel.other_r, LINKIT_ONE_DIVIDER_SUPPLY_MV, mv);
    let thermistor_r = 1.0 / ((1.0 / parallel_r) - (1.0 / LINKIT_ONE_PARALLEL_R));

    let thermistor = Thermistor::new(channel.b, channel.r25, channel.highside);
    thermistor.temperature_from_resistance(thermistor_r)
}

/// Platform-specific setup applied to each numeric field as it is registered.
///
/// Thermistors on LinkIt ONE channels 13 and up need their own conversion.
pub fn linkit_one_field_setup(field: &mut NumericDataField) {
    if field.channel_number() < LINKIT_ONE_DIVIDED_CHANNELS_START {
        return;
    }

    if field.field_type() == FieldType::TemperatureC {
        field.set_alt_conversion(linkit_one_thermistor_conversion);
    }
}

impl fmt::Display for VoltageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            mv_per_bit,
            r1,
            r2,
            offset,
            multiplier,
        } = self;
        write!(
            f,
            "R1 = {r1:.1}, R2 = {r2:.1}, mVPerBit = {mv_per_bit:.4}, Offset = {offset:.4}, Multiplier = {multiplier:.4}"
        )
    }
}

impl fmt::Display for CurrentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            mv_per_bit,
            offset,
            mv_per_amp,
        } = self;
        write!(
            f,
            "Offset = {offset:.1}, mvPerAmp = {mv_per_amp:.1}, mVPerBit = {mv_per_bit:.4}"
        )
    }
}

impl fmt::Display for ThermistorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r25, b, other_r) = (self.r25, self.b, self.other_r);
        let max_adc = self.max_adc as i32;
        let side = if self.highside { "highside" } else { "lowside" };
        write!(
            f,
            "Other R = {other_r:.1}, R25 = {r25:.1}, B = {b:.1}, maxADC = {max_adc}, {side}"
        )
    }
}

impl fmt::Display for ConversionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voltage(channel) => channel.fmt(f),
            Self::Current(channel) => channel.fmt(f),
            Self::Thermistor(channel) => channel.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(expected: f32, actual: f32) {
        assert!(
            (expected - actual).abs() <= 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_conversion_to_volts() {
        let channel = VoltageChannel::new(0.125, 10000.0, 10000.0);
        assert_close(0.0, volts_from_raw(0.0, &channel));
        assert_close(0.25575, volts_from_raw(1023.0, &channel));
        assert_close(1.0, volts_from_raw(4000.0, &channel));
    }

    #[test]
    fn test_voltage_offset_and_multiplier_apply_before_divider() {
        let channel = VoltageChannel {
            offset: 0.1,
            multiplier: 2.0,
            ..VoltageChannel::new(0.125, 10000.0, 10000.0)
        };
        // ((0.5 - 0.1) * 2) * 2
        assert_close(1.6, volts_from_raw(4000.0, &channel));
    }

    #[test]
    fn test_conversion_to_amps() {
        let channel = CurrentChannel {
            mv_per_bit: 0.125,
            offset: 600.0,
            mv_per_amp: 60.0,
        };
        assert_close(0.0, amps_from_raw(4800.0, &channel));
        assert_close(1.0, amps_from_raw(5280.0, &channel));
    }

    #[test]
    fn test_highside_thermistor_conversion() {
        let channel = ThermistorChannel {
            r25: 10000.0,
            b: 3000.0,
            other_r: 10000.0,
            max_adc: 1023.0,
            highside: true,
        };
        assert_close(25.0, celsius_from_raw_thermistor(511.5, &channel));
        let params = ConversionParams::Thermistor(channel);
        assert_close(77.0, convert(FieldType::TemperatureF, 511.5, &params));
        assert_close(298.15, convert(FieldType::TemperatureK, 511.5, &params));
    }

    #[test]
    fn test_mismatched_params_pass_through() {
        let params = ConversionParams::Current(CurrentChannel::default());
        assert_eq!(convert(FieldType::Voltage, 123.0, &params), 123.0);
        assert_eq!(convert(FieldType::Irradiance, 123.0, &params), 123.0);
    }

    #[test]
    fn test_config_strings() {
        let voltage = ConversionParams::Voltage(VoltageChannel::new(0.125, 10000.0, 2000.0));
        assert_eq!(
            alloc::format!("{voltage}"),
            "R1 = 10000.0, R2 = 2000.0, mVPerBit = 0.1250, Offset = 0.0000, Multiplier = 1.0000"
        );

        let thermistor = ConversionParams::Thermistor(ThermistorChannel {
            r25: 10000.0,
            b: 3977.0,
            other_r: 10000.0,
            max_adc: 1023.0,
            highside: false,
        });
        assert_eq!(
            alloc::format!("{thermistor}"),
            "Other R = 10000.0, R25 = 10000.0, B = 3977.0, maxADC = 1023, lowside"
        );
    }

    #[test]
    fn test_linkit_one_setup_only_overrides_high_thermistor_channels() {
        let params = Some(ConversionParams::Thermistor(ThermistorChannel {
            r25: 10000.0,
            b: 3977.0,
            other_r: 10000.0,
            max_adc: 1023.0,
            highside: false,
        }));

        let mut low = NumericDataField::new(FieldType::TemperatureC, params, 1, 1)
            .unwrap()
            .with_channel(12);
        linkit_one_field_setup(&mut low);
        assert!(!low.has_alt_conversion());

        let mut high = NumericDataField::new(FieldType::TemperatureC, params, 1, 1)
            .unwrap()
            .with_channel(13);
        linkit_one_field_setup(&mut high);
        assert!(high.has_alt_conversion());
    }
}
