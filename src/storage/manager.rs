//! Channel registry coordinating the data fields.

use core::fmt;

use log::{debug, error, info};

use super::{DataField, FieldType, MAX_FIELDS, NumericDataField};
use crate::error::DataError;
use crate::fixed_buffer::FixedLengthWriter;
use crate::settings::ChannelSettings;

/// Written by [`DataFieldManager::data_array`] for fields with nothing to read
pub const NO_DATA_VALUE: f32 = f32::NAN;

/// Hook applied to every numeric field as it is registered
pub type FieldSetup = fn(&mut NumericDataField);

/// Registry of up to [`MAX_FIELDS`] data fields
///
/// Fields are addressed either by registration order or by the external
/// channel number they were built for. The first field registered for a
/// channel wins a lookup. Fields are never removed.
#[derive(Debug)]
pub struct DataFieldManager {
    /// Averages each registered numeric field retains
    data_size: usize,
    /// Raw samples per stored average
    averager_size: usize,
    fields: heapless::Vec<DataField, MAX_FIELDS>,
    channel_numbers: heapless::Vec<u32, MAX_FIELDS>,
    /// Complete rows waiting to be read
    data_count: usize,
    field_setup: Option<FieldSetup>,
}

impl DataFieldManager {
    pub fn new(data_size: usize, averager_size: usize) -> Self {
        Self {
            data_size,
            averager_size,
            fields: heapless::Vec::new(),
            channel_numbers: heapless::Vec::new(),
            data_count: 0,
            field_setup: None,
        }
    }

    /// Run `setup` on every numeric field registered from now on.
    pub fn with_field_setup(mut self, setup: FieldSetup) -> Self {
        self.field_setup = Some(setup);
        self
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn averager_size(&self) -> usize {
        self.averager_size
    }

    /// Register a field, returning its index.
    ///
    /// Numeric fields are resized to this manager's data and averager sizes
    /// before the setup hook runs.
    pub fn add_field(&mut self, field: impl Into<DataField>) -> Result<usize, DataError> {
        let mut field = field.into();
        if self.fields.is_full() {
            error!(
                "Cannot add {} on channel {}: registry full",
                field.label(),
                field.channel_number()
            );
            return Err(DataError::RegistryFull {
                capacity: MAX_FIELDS,
            });
        }

        if let Some(numeric) = field.as_numeric_mut() {
            numeric.set_data_sizes(self.data_size, self.averager_size)?;
            if let Some(setup) = self.field_setup {
                setup(numeric);
            }
        }

        let channel = field.channel_number();
        self.fields
            .push(field)
            .map_err(|_| DataError::RegistryFull {
                capacity: MAX_FIELDS,
            })?;
        self.channel_numbers
            .push(channel)
            .map_err(|_| DataError::RegistryFull {
                capacity: MAX_FIELDS,
            })?;

        Ok(self.fields.len() - 1)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [DataField] {
        &mut self.fields
    }

    pub fn field(&self, index: usize) -> Option<&DataField> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut DataField> {
        self.fields.get_mut(index)
    }

    fn channel_index(&self, channel: u32) -> Option<usize> {
        self.channel_numbers.iter().position(|&n| n == channel)
    }

    /// First field registered for `channel`.
    pub fn channel(&self, channel: u32) -> Option<&DataField> {
        let index = self.channel_index(channel)?;
        self.fields.get(index)
    }

    pub fn channel_mut(&mut self, channel: u32) -> Option<&mut DataField> {
        let index = self.channel_index(channel)?;
        self.fields.get_mut(index)
    }

    /// Channel number of each field, in registration order.
    pub fn channel_numbers(&self) -> &[u32] {
        &self.channel_numbers
    }

    /// Complete rows stored and not yet consumed.
    pub fn data_count(&self) -> usize {
        self.data_count
    }

    /// Mark every stored row as consumed after reading fields directly.
    pub fn clear_data_count(&mut self) {
        self.data_count = 0;
    }

    /// True if any field has a readable value.
    pub fn has_data(&self) -> bool {
        self.fields.iter().any(DataField::has_data)
    }

    /// Feed `data[i]` to the numeric field at index `i`.
    ///
    /// Text fields and samples past the field count are skipped. Returns true
    /// when a new row of averages was committed.
    pub fn store_data_array(&mut self, data: &[i32]) -> bool {
        let mut committed = false;
        for (field, &raw) in self.fields.iter_mut().zip(data) {
            if let Some(numeric) = field.as_numeric_mut() {
                committed |= numeric.store_data(raw);
            }
        }

        if committed {
            self.data_count = (self.data_count + 1).min(self.data_size.max(1));
        }
        committed
    }

    /// Read the oldest row, one value per field.
    ///
    /// Fields with nothing to read, and text fields, produce
    /// [`NO_DATA_VALUE`]. With `remove` the row is consumed from every field,
    /// including those that did not fit in `out`. Returns the number of
    /// values written.
    pub fn data_array(&mut self, out: &mut [f32], converted: bool, remove: bool) -> usize {
        let mut written = 0;
        for (i, field) in self.fields.iter_mut().enumerate() {
            let value = match field {
                DataField::Numeric(numeric) if remove => {
                    let taken = if converted {
                        numeric.take_converted()
                    } else {
                        numeric.take_raw()
                    };
                    taken.unwrap_or(NO_DATA_VALUE)
                }
                DataField::Numeric(numeric) => {
                    let read = if converted {
                        numeric.converted(0)
                    } else {
                        numeric.raw(0)
                    };
                    read.unwrap_or(NO_DATA_VALUE)
                }
                DataField::Text(text) => {
                    if remove {
                        text.take();
                    }
                    NO_DATA_VALUE
                }
            };

            if let Some(slot) = out.get_mut(i) {
                *slot = value;
                written += 1;
            }
        }

        if remove {
            self.data_count = self.data_count.saturating_sub(1);
        }
        written
    }

    /// Format the oldest row as a CSV line of converted values.
    ///
    /// Fields with nothing to read leave their column empty.
    pub fn write_row<W: fmt::Write>(&self, out: &mut W, decimals: usize) -> Result<(), DataError> {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            if field.has_data() {
                field.write_data_as_string(out, 0, decimals)?;
            }
        }
        out.write_str("\r\n")?;
        Ok(())
    }

    /// Drop the oldest row from every field.
    pub fn discard_row(&mut self) {
        for field in self.fields.iter_mut() {
            match field {
                DataField::Numeric(numeric) => {
                    numeric.take_raw();
                }
                DataField::Text(text) => {
                    text.take();
                }
            }
        }
        self.data_count = self.data_count.saturating_sub(1);
    }

    /// Write the CSV header line into `buffer`, returning the bytes written.
    ///
    /// Output that does not fit is truncated.
    pub fn write_headers_to_buffer(&self, buffer: &mut [u8]) -> usize {
        let mut writer = FixedLengthWriter::new(buffer);
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writer.write_truncating(", ");
            }
            writer.write_truncating(field.label());
        }
        writer.write_truncating("\r\n");
        writer.len()
    }

    /// Register a numeric field for every valid analog channel in `settings`.
    ///
    /// Returns the number of fields added. Incomplete channels are skipped.
    pub fn setup_all_valid_channels(
        &mut self,
        settings: &impl ChannelSettings,
    ) -> Result<usize, DataError> {
        let mut added = 0;
        for channel in 1..=settings.max_channel_count() {
            if !settings.channel_is_valid(channel) {
                continue;
            }

            let field_type = settings.channel_type(channel);
            if !field_type.is_analog_channel() {
                debug!("Skipping channel {} of type {:?}", channel, field_type);
                continue;
            }

            let field = NumericDataField::new(
                field_type,
                settings.conversion_params(channel),
                self.data_size,
                self.averager_size,
            )?
            .with_channel(channel);
            self.add_field(field)?;
            added += 1;

            info!("Added channel {} ({})", channel, field_type.label());
        }
        Ok(added)
    }

    /// Type of the field registered for `channel`, if any.
    pub fn channel_type(&self, channel: u32) -> Option<FieldType> {
        self.channel(channel).map(DataField::field_type)
    }
}
