//! Timing configuration for the sampling pipeline.

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::storage::MAX_FIELDS;

/// Every field selected for debug output
pub const ALL_DEBUG_FIELDS: u32 = u32::MAX;

fn all_debug_fields() -> u32 {
    ALL_DEBUG_FIELDS
}

/// Sampling and averaging intervals for the data pipeline.
///
/// Each stored or uploaded value is the average of
/// `values_per_second * *_averaging_interval_secs` raw samples, and a
/// stored/uploaded batch spans `*_interval_secs`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataConfig {
    pub values_per_second: u32,
    pub storage_averaging_interval_secs: u32,
    pub upload_averaging_interval_secs: u32,
    pub storage_interval_secs: u32,
    pub upload_interval_secs: u32,
    /// Log a converted reading per field once a second.
    pub enable_data_debug: bool,
    /// Bit `i` selects field `i` for debug output.
    #[serde(default = "all_debug_fields")]
    pub debug_fields: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            values_per_second: 1,
            storage_averaging_interval_secs: 60,
            upload_averaging_interval_secs: 60,
            storage_interval_secs: 60,
            upload_interval_secs: 900,
            enable_data_debug: false,
            debug_fields: ALL_DEBUG_FIELDS,
        }
    }
}

/// Averages needed to cover `interval` in steps of `averaging_interval`,
/// rounded up.
pub fn number_of_averages(interval: u32, averaging_interval: u32) -> u32 {
    if averaging_interval == 0 {
        return 0;
    }
    interval.div_ceil(averaging_interval)
}

/// Debug field mask from a list of two-digit field numbers, e.g. `"01, 03"`.
///
/// Numbers count from 1. Entries that are not numbers, or fall outside
/// the 32 fields a manager can hold, are ignored.
pub fn debug_fields_from_list(list: &str) -> u32 {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|entry| entry.parse::<u32>().ok())
        .filter(|&number| (1..=MAX_FIELDS as u32).contains(&number))
        .fold(0, |mask, number| mask | (1 << (number - 1)))
}

/// Bytes per field in a formatted upload entry
const UPLOAD_BYTES_PER_FIELD: usize = 10;
/// Fixed bytes per upload entry
const UPLOAD_BYTES_PER_ENTRY: usize = 20;
const MIN_UPLOAD_BUFFER_SIZE: usize = 512;

fn upload_bytes(averages: u32, field_count: usize) -> Option<usize> {
    let per_entry = field_count
        .checked_mul(UPLOAD_BYTES_PER_FIELD)?
        .checked_add(UPLOAD_BYTES_PER_ENTRY)?;
    (averages as usize).checked_mul(per_entry)?.checked_mul(2)
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.values_per_second == 0 {
            return Err(DataError::InvalidConfiguration(
                "values per second must be at least 1",
            ));
        }
        if self.storage_averaging_interval_secs == 0 || self.upload_averaging_interval_secs == 0 {
            return Err(DataError::InvalidConfiguration(
                "averaging intervals must be at least 1s",
            ));
        }
        if self.storage_interval_secs < self.storage_averaging_interval_secs {
            return Err(DataError::InvalidConfiguration(
                "storage interval is shorter than its averaging interval",
            ));
        }
        if self.upload_interval_secs < self.upload_averaging_interval_secs {
            return Err(DataError::InvalidConfiguration(
                "upload interval is shorter than its averaging interval",
            ));
        }

        let rate = self.values_per_second;
        let storage_samples = rate.checked_mul(self.storage_averaging_interval_secs);
        let upload_samples = rate.checked_mul(self.upload_averaging_interval_secs);
        if storage_samples.is_none() || upload_samples.is_none() {
            return Err(DataError::InvalidConfiguration(
                "samples per average overflows",
            ));
        }

        let upload_averages = self.number_of_averages_to_upload();
        if upload_bytes(upload_averages, MAX_FIELDS).is_none() {
            return Err(DataError::InvalidConfiguration(
                "upload buffer size overflows",
            ));
        }
        Ok(())
    }

    pub fn number_of_averages_to_store(&self) -> u32 {
        number_of_averages(
            self.storage_interval_secs,
            self.storage_averaging_interval_secs,
        )
    }

    pub fn number_of_averages_to_upload(&self) -> u32 {
        number_of_averages(
            self.upload_interval_secs,
            self.upload_averaging_interval_secs,
        )
    }

    /// Raw samples per stored average
    pub fn storage_averager_size(&self) -> u32 {
        let rate = self.values_per_second;
        rate.saturating_mul(self.storage_averaging_interval_secs)
    }

    /// Raw samples per uploaded average
    pub fn upload_averager_size(&self) -> u32 {
        let rate = self.values_per_second;
        rate.saturating_mul(self.upload_averaging_interval_secs)
    }

    /// Bytes needed to format one upload batch for `field_count` fields
    pub fn upload_buffer_size(&self, field_count: usize) -> usize {
        upload_bytes(self.number_of_averages_to_upload(), field_count)
            .unwrap_or(usize::MAX)
            .max(MIN_UPLOAD_BUFFER_SIZE)
    }

    /// True if field `index` is selected for debug output.
    pub fn debug_field_enabled(&self, index: usize) -> bool {
        index < MAX_FIELDS && (self.debug_fields & (1 << index)) != 0
    }
}
