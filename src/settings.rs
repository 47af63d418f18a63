//! Per-channel settings parsed from `ChannelN.key = value` lines.
//!
//! ```text
//! # Battery voltage
//! Channel1.type = voltage
//! Channel1.mvperbit = 0.125
//! Channel1.r1 = 10000
//! Channel1.r2 = 2000
//! ```
//!
//! A channel's `type` must be set before its other keys. A channel becomes
//! valid once every required key for its type has been set.

use log::{debug, warn};

use crate::conversion::{ConversionParams, CurrentChannel, ThermistorChannel, VoltageChannel};
use crate::error::ChannelSettingError;
use crate::storage::FieldType;

/// Highest channel number a settings file can describe
pub const MAX_CHANNELS: u32 = 32;

/// Channel configuration consumed by
/// [`DataFieldManager::setup_all_valid_channels`](crate::DataFieldManager::setup_all_valid_channels).
pub trait ChannelSettings {
    fn max_channel_count(&self) -> u32;
    /// True when every required setting for the channel's type is present.
    fn channel_is_valid(&self, channel: u32) -> bool;
    fn channel_type(&self, channel: u32) -> FieldType;
    fn conversion_params(&self, channel: u32) -> Option<ConversionParams>;
}

const VOLTAGE_MV_PER_BIT: u8 = 1 << 0;
const VOLTAGE_R1: u8 = 1 << 1;
const VOLTAGE_R2: u8 = 1 << 2;
const VOLTAGE_REQUIRED: u8 = VOLTAGE_MV_PER_BIT | VOLTAGE_R1 | VOLTAGE_R2;

const CURRENT_MV_PER_BIT: u8 = 1 << 0;
const CURRENT_OFFSET: u8 = 1 << 1;
const CURRENT_MV_PER_AMP: u8 = 1 << 2;
const CURRENT_REQUIRED: u8 = CURRENT_MV_PER_BIT | CURRENT_OFFSET | CURRENT_MV_PER_AMP;

const THERMISTOR_MAX_ADC: u8 = 1 << 0;
const THERMISTOR_B: u8 = 1 << 1;
const THERMISTOR_R25: u8 = 1 << 2;
const THERMISTOR_OTHER_R: u8 = 1 << 3;
const THERMISTOR_REQUIRED: u8 =
    THERMISTOR_MAX_ADC | THERMISTOR_B | THERMISTOR_R25 | THERMISTOR_OTHER_R;

#[derive(Debug, Clone, Copy)]
struct ChannelEntry {
    field_type: FieldType,
    params: Option<ConversionParams>,
    values_set: u8,
}

impl ChannelEntry {
    const EMPTY: Self = Self {
        field_type: FieldType::Invalid,
        params: None,
        values_set: 0,
    };

    fn required(&self) -> Option<u8> {
        match self.params? {
            ConversionParams::Voltage(_) => Some(VOLTAGE_REQUIRED),
            ConversionParams::Current(_) => Some(CURRENT_REQUIRED),
            ConversionParams::Thermistor(_) => Some(THERMISTOR_REQUIRED),
        }
    }

    fn is_valid(&self) -> bool {
        self.required()
            .is_some_and(|required| self.values_set & required == required)
    }
}

/// Settings store for up to [`MAX_CHANNELS`] analog channels.
#[derive(Debug, Clone)]
pub struct DataChannelSettings {
    channels: [ChannelEntry; MAX_CHANNELS as usize],
}

impl Default for DataChannelSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl DataChannelSettings {
    pub const fn new() -> Self {
        Self {
            channels: [ChannelEntry::EMPTY; MAX_CHANNELS as usize],
        }
    }

    /// Parse every line of `text`, logging and skipping lines that fail.
    pub fn from_lines(text: &str) -> Self {
        let mut settings = Self::new();
        for (number, line) in text.lines().enumerate() {
            if let Err(e) = settings.parse_line(line) {
                warn!(
                    "Channel settings line {}: {} ({:?})",
                    number + 1,
                    e,
                    line.trim()
                );
            }
        }
        settings
    }

    /// Apply one settings line. Blank lines and `#` comments are accepted.
    pub fn parse_line(&mut self, line: &str) -> Result<(), ChannelSettingError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (setting, value) = line.split_once('=').ok_or(ChannelSettingError::NoEquals)?;
        let (channel, key) = setting
            .trim()
            .split_once('.')
            .ok_or(ChannelSettingError::NoSetting)?;
        let Some(channel) = parse_channel(channel.trim()) else {
            return Err(ChannelSettingError::NoChannel);
        };
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(ChannelSettingError::NoSetting);
        }

        let entry = &mut self.channels[(channel - 1) as usize];
        if key.eq_ignore_ascii_case("type") {
            let field_type = parse_type(value).ok_or(ChannelSettingError::UnknownType)?;
            *entry = ChannelEntry {
                field_type,
                params: default_params(field_type),
                values_set: 0,
            };
            debug!("Channel {} type {:?}", channel, field_type);
            return Ok(());
        }

        let flag = match entry.params.as_mut() {
            Some(ConversionParams::Voltage(params)) => apply_voltage_setting(params, key, value)?,
            Some(ConversionParams::Current(params)) => apply_current_setting(params, key, value)?,
            Some(ConversionParams::Thermistor(params)) => {
                apply_thermistor_setting(params, key, value)?
            }
            None => return Err(ChannelSettingError::ChannelTypeNotSet),
        };
        entry.values_set |= flag;
        Ok(())
    }

    fn entry(&self, channel: u32) -> Option<&ChannelEntry> {
        if channel == 0 {
            return None;
        }
        self.channels.get((channel - 1) as usize)
    }
}

impl ChannelSettings for DataChannelSettings {
    fn max_channel_count(&self) -> u32 {
        MAX_CHANNELS
    }

    fn channel_is_valid(&self, channel: u32) -> bool {
        self.entry(channel).is_some_and(ChannelEntry::is_valid)
    }

    fn channel_type(&self, channel: u32) -> FieldType {
        self.entry(channel)
            .map_or(FieldType::Invalid, |entry| entry.field_type)
    }

    fn conversion_params(&self, channel: u32) -> Option<ConversionParams> {
        self.entry(channel).and_then(|entry| entry.params)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

/// `Channel12` or `ch12`, numbered from 1.
fn parse_channel(s: &str) -> Option<u32> {
    let number = strip_prefix_ignore_case(s, "channel")
        .or_else(|| strip_prefix_ignore_case(s, "ch"))?;
    let channel: u32 = number.trim().parse().ok()?;
    (1..=MAX_CHANNELS).contains(&channel).then_some(channel)
}

fn parse_type(s: &str) -> Option<FieldType> {
    const TYPES: [(&str, FieldType); 6] = [
        ("voltage", FieldType::Voltage),
        ("current", FieldType::Current),
        ("temperature_c", FieldType::TemperatureC),
        ("thermistor", FieldType::TemperatureC),
        ("temperature_f", FieldType::TemperatureF),
        ("temperature_k", FieldType::TemperatureK),
    ];

    TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|&(_, field_type)| field_type)
}

fn default_params(field_type: FieldType) -> Option<ConversionParams> {
    match field_type {
        FieldType::Voltage => Some(ConversionParams::Voltage(VoltageChannel::default())),
        FieldType::Current => Some(ConversionParams::Current(CurrentChannel::default())),
        t if t.is_temperature() => {
            Some(ConversionParams::Thermistor(ThermistorChannel::default()))
        }
        _ => None,
    }
}

fn parse_float(value: &str) -> Result<f32, ChannelSettingError> {
    value
        .parse()
        .map_err(|_| ChannelSettingError::InvalidSetting)
}

fn parse_highside(value: &str) -> Result<bool, ChannelSettingError> {
    let is_any = |names: &[&str]| names.iter().any(|name| name.eq_ignore_ascii_case(value));
    if is_any(&["1", "true", "yes", "highside"]) {
        Ok(true)
    } else if is_any(&["0", "false", "no", "lowside"]) {
        Ok(false)
    } else {
        Err(ChannelSettingError::InvalidSetting)
    }
}

fn apply_voltage_setting(
    params: &mut VoltageChannel,
    key: &str,
    value: &str,
) -> Result<u8, ChannelSettingError> {
    let (target, flag) = match parse_key(key) {
        Key::MvPerBit => (&mut params.mv_per_bit, VOLTAGE_MV_PER_BIT),
        Key::R1 => (&mut params.r1, VOLTAGE_R1),
        Key::R2 => (&mut params.r2, VOLTAGE_R2),
        Key::Offset => (&mut params.offset, 0),
        Key::Multiplier => (&mut params.multiplier, 0),
        _ => return Err(ChannelSettingError::UnknownSetting),
    };
    *target = parse_float(value)?;
    Ok(flag)
}

fn apply_current_setting(
    params: &mut CurrentChannel,
    key: &str,
    value: &str,
) -> Result<u8, ChannelSettingError> {
    let (target, flag) = match parse_key(key) {
        Key::MvPerBit => (&mut params.mv_per_bit, CURRENT_MV_PER_BIT),
        Key::Offset => (&mut params.offset, CURRENT_OFFSET),
        Key::MvPerAmp => (&mut params.mv_per_amp, CURRENT_MV_PER_AMP),
        _ => return Err(ChannelSettingError::UnknownSetting),
    };
    *target = parse_float(value)?;
    Ok(flag)
}

fn apply_thermistor_setting(
    params: &mut ThermistorChannel,
    key: &str,
    value: &str,
) -> Result<u8, ChannelSettingError> {
    let (target, flag) = match parse_key(key) {
        Key::MaxAdc => (&mut params.max_adc, THERMISTOR_MAX_ADC),
        Key::B => (&mut params.b, THERMISTOR_B),
        Key::R25 => (&mut params.r25, THERMISTOR_R25),
        Key::OtherR => (&mut params.other_r, THERMISTOR_OTHER_R),
        Key::Highside => {
            params.highside = parse_highside(value)?;
            return Ok(0);
        }
        _ => return Err(ChannelSettingError::UnknownSetting),
    };
    *target = parse_float(value)?;
    Ok(flag)
}

/// Setting names recognised across all channel types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    MvPerBit,
    R1,
    R2,
    Offset,
    Multiplier,
    MvPerAmp,
    MaxAdc,
    B,
    R25,
    OtherR,
    Highside,
    Unknown,
}

fn parse_key(key: &str) -> Key {
    const KEYS: [(&str, Key); 11] = [
        ("mvperbit", Key::MvPerBit),
        ("r1", Key::R1),
        ("r2", Key::R2),
        ("offset", Key::Offset),
        ("multiplier", Key::Multiplier),
        ("mvperamp", Key::MvPerAmp),
        ("maxadc", Key::MaxAdc),
        ("b", Key::B),
        ("r25", Key::R25),
        ("otherr", Key::OtherR),
        ("highside", Key::Highside),
    ];

    KEYS.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map_or(Key::Unknown, |&(_, key)| key)
}
