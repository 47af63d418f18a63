//! Fan-out of raw samples to the storage, upload and debug managers.

use core::fmt;

use log::{debug, info};

use super::{DEFAULT_DECIMALS, DataField, DataFieldManager, FieldSetup};
use crate::config::DataConfig;
use crate::error::DataError;
use crate::settings::ChannelSettings;

/// Which managers committed a new average for a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulatorEvent {
    pub storage: bool,
    pub upload: bool,
    pub debug: bool,
}

/// Fans raw ADC samples into the storage, upload and debug managers
///
/// All three managers are built from the same channel settings, so field `i`
/// refers to the same channel in each. They differ only in how many samples
/// go into an average and how many averages they keep:
///
/// - **storage**: one CSV row per storage averaging interval
/// - **upload**: one batch entry per upload averaging interval
/// - **debug**: one value per second, logged when data debug is enabled
///
/// ## Usage
///
/// ```rust,ignore
/// let settings = DataChannelSettings::from_lines(CHANNEL_SETTINGS);
/// let mut accumulator = SampleAccumulator::new(DataConfig::default(), &settings)?;
///
/// // Called values_per_second times a second
/// let event = accumulator.new_data_array(&readings);
/// if event.storage {
///     accumulator.write_storage_row(&mut csv_line)?;
/// }
/// ```
#[derive(Debug)]
pub struct SampleAccumulator {
    config: DataConfig,
    storage: DataFieldManager,
    upload: DataFieldManager,
    debug: DataFieldManager,
    upload_pending: bool,
}

impl SampleAccumulator {
    pub fn new(config: DataConfig, settings: &impl ChannelSettings) -> Result<Self, DataError> {
        Self::build(config, settings, None)
    }

    /// As [`new`](Self::new), running `setup` on every numeric field created.
    pub fn with_field_setup(
        config: DataConfig,
        settings: &impl ChannelSettings,
        setup: FieldSetup,
    ) -> Result<Self, DataError> {
        Self::build(config, settings, Some(setup))
    }

    fn build(
        config: DataConfig,
        settings: &impl ChannelSettings,
        setup: Option<FieldSetup>,
    ) -> Result<Self, DataError> {
        config.validate()?;

        let manager = |data_size: u32, averager_size: u32| {
            let manager = DataFieldManager::new(data_size as usize, averager_size as usize);
            match setup {
                Some(setup) => manager.with_field_setup(setup),
                None => manager,
            }
        };

        let mut storage = manager(
            config.number_of_averages_to_store(),
            config.storage_averager_size(),
        );
        let mut upload = manager(
            config.number_of_averages_to_upload(),
            config.upload_averager_size(),
        );
        let mut debug = manager(1, config.values_per_second);

        let storage_fields = storage.setup_all_valid_channels(settings)?;
        let upload_fields = upload.setup_all_valid_channels(settings)?;
        let debug_fields = debug.setup_all_valid_channels(settings)?;

        if storage_fields == 0 {
            return Err(DataError::InvalidConfiguration(
                "no valid channels configured",
            ));
        }
        if storage_fields != upload_fields || storage_fields != debug_fields {
            return Err(DataError::InvalidConfiguration(
                "managers disagree on field count",
            ));
        }

        info!(
            "Storing {} averages of {} samples, uploading {} averages of {} samples",
            storage.data_size(),
            storage.averager_size(),
            upload.data_size(),
            upload.averager_size()
        );
        for field in storage.fields() {
            if let Some(params) = field.as_numeric().and_then(|f| f.conversion_params()) {
                info!(
                    "Channel {} {}: {}",
                    field.channel_number(),
                    field.label(),
                    params
                );
            }
        }

        Ok(Self {
            config,
            storage,
            upload,
            debug,
            upload_pending: false,
        })
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Feed one raw sample per field to every manager.
    pub fn new_data_array(&mut self, data: &[i32]) -> AccumulatorEvent {
        let event = AccumulatorEvent {
            storage: self.storage.store_data_array(data),
            upload: self.upload.store_data_array(data),
            debug: self.config.enable_data_debug && self.debug.store_data_array(data),
        };

        if event.upload {
            debug!(
                "Upload average complete ({} of {})",
                self.upload.data_count(),
                self.upload.data_size()
            );
        }
        event
    }

    pub fn field_count(&self) -> usize {
        self.storage.field_count()
    }

    pub fn channel_numbers(&self) -> &[u32] {
        self.storage.channel_numbers()
    }

    pub fn storage_field(&self, index: usize) -> Option<&DataField> {
        self.storage.field(index)
    }

    pub fn upload_field(&self, index: usize) -> Option<&DataField> {
        self.upload.field(index)
    }

    pub fn storage_data_remaining(&self) -> usize {
        self.storage.data_count()
    }

    pub fn upload_data_remaining(&self) -> usize {
        self.upload.data_count()
    }

    pub fn upload_pending(&self) -> bool {
        self.upload_pending
    }

    pub fn set_upload_pending(&mut self, pending: bool) {
        self.upload_pending = pending;
    }

    pub fn number_of_averages_for_storage(&self) -> u32 {
        self.config.number_of_averages_to_store()
    }

    pub fn number_of_averages_for_upload(&self) -> u32 {
        self.config.number_of_averages_to_upload()
    }

    pub fn upload_buffer_size(&self) -> usize {
        self.config.upload_buffer_size(self.field_count())
    }

    pub fn write_headers_to_buffer(&self, buffer: &mut [u8]) -> usize {
        self.storage.write_headers_to_buffer(buffer)
    }

    /// Write the oldest stored row as a CSV line and consume it.
    ///
    /// Returns false if there was no row to write.
    pub fn write_storage_row<W: fmt::Write>(&mut self, out: &mut W) -> Result<bool, DataError> {
        if self.storage.data_count() == 0 {
            return Ok(false);
        }
        self.storage.write_row(out, DEFAULT_DECIMALS)?;
        self.storage.discard_row();
        Ok(true)
    }

    /// Consume the oldest upload row as converted values.
    ///
    /// Returns the number of values written, or 0 if no row was ready.
    pub fn take_upload_data(&mut self, out: &mut [f32]) -> usize {
        if self.upload.data_count() == 0 {
            return 0;
        }
        self.upload.data_array(out, true, true)
    }

    /// Consume every completed debug average, logging those of the fields
    /// selected in the config's debug field mask.
    ///
    /// Returns the number of values logged.
    pub fn drain_debug(&mut self) -> usize {
        let mut logged = 0;
        for (index, field) in self.debug.fields_mut().iter_mut().enumerate() {
            let Some(numeric) = field.as_numeric_mut() else {
                continue;
            };
            let enabled = self.config.debug_field_enabled(index);
            while let Some(raw) = numeric.take_raw() {
                if !enabled {
                    continue;
                }
                debug!(
                    "Channel {}: {:.3} ({})",
                    numeric.channel_number(),
                    numeric.convert(raw),
                    raw
                );
                logged += 1;
            }
        }
        self.debug.clear_data_count();
        logged
    }
}
