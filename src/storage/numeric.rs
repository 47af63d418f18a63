//! Averaged numeric field.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::FieldType;
use super::ring::RingIndex;
use crate::averager::Averager;
use crate::conversion::{self, AltConversion, ConversionParams};
use crate::error::DataError;

/// Ring buffer of averaged readings for one analog channel.
///
/// Every call to [`store_data`](Self::store_data) feeds the inner averager.
/// Once that averager fills, its rounded average is committed to the outer
/// ring and the averager starts a new window.
#[derive(Debug, Clone)]
pub struct NumericDataField {
    field_type: FieldType,
    channel: u32,
    conversion: Option<ConversionParams>,
    alt_conversion: Option<AltConversion>,
    averager: Averager<i32>,
    data: Vec<f32>,
    ring: RingIndex,
}

impl NumericDataField {
    /// Create a field holding `capacity` averages of `averager_capacity` samples each.
    pub fn new(
        field_type: FieldType,
        conversion: Option<ConversionParams>,
        capacity: usize,
        averager_capacity: usize,
    ) -> Result<Self, DataError> {
        if capacity == 0 {
            return Err(DataError::InvalidConfiguration(
                "field capacity must be at least 1",
            ));
        }

        Ok(Self {
            field_type,
            channel: 0,
            conversion,
            alt_conversion: None,
            averager: Averager::new(averager_capacity)?,
            data: vec![0.0; capacity],
            ring: RingIndex::new(capacity),
        })
    }

    /// Resize the outer ring to `capacity` averages of `averager_capacity`
    /// samples each, discarding anything stored.
    pub fn set_data_sizes(
        &mut self,
        capacity: usize,
        averager_capacity: usize,
    ) -> Result<(), DataError> {
        if capacity == 0 {
            return Err(DataError::InvalidConfiguration(
                "field capacity must be at least 1",
            ));
        }

        self.averager = Averager::new(averager_capacity)?;
        self.data = vec![0.0; capacity];
        self.ring = RingIndex::new(capacity);
        Ok(())
    }

    /// Bind the field to an external channel number.
    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn channel_number(&self) -> u32 {
        self.channel
    }

    pub fn conversion_params(&self) -> Option<&ConversionParams> {
        self.conversion.as_ref()
    }

    pub fn set_alt_conversion(&mut self, conversion: AltConversion) {
        self.alt_conversion = Some(conversion);
    }

    pub fn has_alt_conversion(&self) -> bool {
        self.alt_conversion.is_some()
    }

    /// Number of averages the outer ring retains.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of raw samples per stored average.
    pub fn averager_capacity(&self) -> usize {
        self.averager.capacity()
    }

    /// Number of readable stored averages.
    pub fn stored_count(&self) -> usize {
        self.ring.len()
    }

    pub fn has_data(&self) -> bool {
        self.ring.len() > 0
    }

    /// Feed one raw sample. Returns true when a new average was committed.
    pub fn store_data(&mut self, raw: i32) -> bool {
        self.averager.new_data(raw);
        if !self.averager.full() {
            return false;
        }

        let slot = self.ring.push();
        self.data[slot] = self.averager.average() as f32;
        self.averager.reset(None);
        true
    }

    /// Stored average at logical `index` (0 is the oldest).
    pub fn raw(&self, index: usize) -> Result<f32, DataError> {
        Ok(self.data[self.ring.slot(index)?])
    }

    /// Stored average at logical `index` converted to engineering units.
    pub fn converted(&self, index: usize) -> Result<f32, DataError> {
        self.raw(index).map(|raw| self.convert(raw))
    }

    /// Remove and return the oldest stored average.
    pub fn take_raw(&mut self) -> Option<f32> {
        self.ring.pop().map(|slot| self.data[slot])
    }

    /// Remove and return the oldest stored average, converted.
    pub fn take_converted(&mut self) -> Option<f32> {
        self.take_raw().map(|raw| self.convert(raw))
    }

    /// Apply this field's conversion to a raw value.
    pub fn convert(&self, raw: f32) -> f32 {
        let Some(params) = self.conversion.as_ref() else {
            return raw;
        };

        match self.alt_conversion {
            Some(alt) => alt(raw, params),
            None => conversion::convert(self.field_type, raw, params),
        }
    }

    pub fn write_raw_as_string<W: fmt::Write>(
        &self,
        out: &mut W,
        index: usize,
        decimals: usize,
    ) -> Result<(), DataError> {
        let value = self.raw(index)?;
        write!(out, "{value:.decimals$}")?;
        Ok(())
    }

    pub fn write_converted_as_string<W: fmt::Write>(
        &self,
        out: &mut W,
        index: usize,
        decimals: usize,
    ) -> Result<(), DataError> {
        let value = self.converted(index)?;
        write!(out, "{value:.decimals$}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{CurrentChannel, VoltageChannel};
    use crate::fixed_buffer::FixedLengthWriter;

    fn voltage_field(capacity: usize, averager_capacity: usize) -> NumericDataField {
        let params = ConversionParams::Voltage(VoltageChannel::new(0.125, 10000.0, 10000.0));
        NumericDataField::new(
            FieldType::Voltage,
            Some(params),
            capacity,
            averager_capacity,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_capacities_are_rejected() {
        assert!(matches!(
            NumericDataField::new(FieldType::Voltage, None, 0, 1),
            Err(DataError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            NumericDataField::new(FieldType::Voltage, None, 1, 0),
            Err(DataError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_set_data_sizes_resizes_both_rings() {
        let mut field = voltage_field(2, 4);
        field.store_data(4000);
        field.set_data_sizes(3, 1).unwrap();
        assert_eq!(field.capacity(), 3);
        assert_eq!(field.averager_capacity(), 1);
        assert!(!field.has_data());

        assert!(field.store_data(4000));
        assert_eq!(field.raw(0), Ok(4000.0));
    }

    #[test]
    fn test_set_data_sizes_rejects_zero() {
        let mut field = voltage_field(2, 4);
        assert!(matches!(
            field.set_data_sizes(0, 1),
            Err(DataError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            field.set_data_sizes(1, 0),
            Err(DataError::InvalidConfiguration(_))
        ));
        assert_eq!(field.capacity(), 2);
        assert_eq!(field.averager_capacity(), 4);
    }

    #[test]
    fn test_decimation_commits_one_value_per_window() {
        let mut field = voltage_field(5, 4);
        for raw in [10, 20, 30] {
            assert!(!field.store_data(raw));
        }
        assert!(!field.has_data());
        assert_eq!(field.stored_count(), 0);

        assert!(field.store_data(40));
        assert!(field.has_data());
        assert_eq!(field.stored_count(), 1);
        assert_eq!(field.raw(0), Ok(25.0));
    }

    #[test]
    fn test_averager_restarts_after_commit() {
        let mut field = voltage_field(5, 2);
        field.store_data(100);
        field.store_data(100);
        field.store_data(10);
        assert_eq!(field.stored_count(), 1);
        field.store_data(20);
        assert_eq!(field.stored_count(), 2);
        assert_eq!(field.raw(0), Ok(100.0));
        assert_eq!(field.raw(1), Ok(15.0));
    }

    #[test]
    fn test_outer_ring_overwrites_oldest() {
        let mut field = voltage_field(3, 1);
        for raw in 1..=4 {
            field.store_data(raw);
        }
        assert_eq!(field.stored_count(), 3);
        assert_eq!(field.raw(0), Ok(2.0));
        assert_eq!(field.raw(2), Ok(4.0));
    }

    #[test]
    fn test_read_out_of_range() {
        let mut field = voltage_field(3, 1);
        assert_eq!(
            field.raw(0),
            Err(DataError::IndexOutOfRange { index: 0, len: 0 })
        );
        field.store_data(1);
        assert!(field.converted(1).is_err());
    }

    #[test]
    fn test_converted_reads() {
        let mut field = voltage_field(3, 1);
        field.store_data(1023);
        field.store_data(4000);
        assert!((field.converted(0).unwrap() - 0.25575).abs() < 1e-4);
        assert!((field.converted(1).unwrap() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_field_without_params_passes_through() {
        let mut field = NumericDataField::new(FieldType::Irradiance, None, 2, 1).unwrap();
        field.store_data(850);
        assert_eq!(field.converted(0), Ok(850.0));
    }

    #[test]
    fn test_alt_conversion_overrides_type_dispatch() {
        fn double(raw: f32, _: &ConversionParams) -> f32 {
            raw * 2.0
        }

        let params = ConversionParams::Current(CurrentChannel::default());
        let mut field = NumericDataField::new(FieldType::Current, Some(params), 2, 1).unwrap();
        field.set_alt_conversion(double);
        field.store_data(21);
        assert_eq!(field.converted(0), Ok(42.0));
    }

    #[test]
    fn test_take_consumes_oldest() {
        let mut field = voltage_field(3, 1);
        field.store_data(4000);
        field.store_data(8000);

        assert_eq!(field.take_raw(), Some(4000.0));
        assert_eq!(field.stored_count(), 1);
        assert!((field.take_converted().unwrap() - 2.0).abs() < 1e-4);
        assert!(!field.has_data());
        assert_eq!(field.take_raw(), None);
    }

    #[test]
    fn test_data_as_string() {
        let mut field = voltage_field(3, 1);
        field.store_data(4000);

        let mut buffer = [0u8; 16];
        let mut writer = FixedLengthWriter::new(&mut buffer);
        field.write_converted_as_string(&mut writer, 0, 4).unwrap();
        assert_eq!(writer.as_str(), "1.0000");

        let mut buffer = [0u8; 16];
        let mut writer = FixedLengthWriter::new(&mut buffer);
        field.write_raw_as_string(&mut writer, 0, 1).unwrap();
        assert_eq!(writer.as_str(), "4000.0");
    }

    #[test]
    fn test_data_as_string_reports_small_buffer() {
        let mut field = voltage_field(3, 1);
        field.store_data(4000);

        let mut buffer = [0u8; 3];
        let mut writer = FixedLengthWriter::new(&mut buffer);
        assert_eq!(
            field.write_raw_as_string(&mut writer, 0, 4),
            Err(DataError::BufferFull)
        );
    }
}
