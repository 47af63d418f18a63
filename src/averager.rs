//! Fixed-capacity sliding-window averager for raw ADC samples.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::DataError;

/// Integer sample types the averager can hold.
///
/// Sums are accumulated in `i64` so a full window of any of these types
/// cannot overflow.
pub trait Sample: Copy + Default {
    fn to_i64(self) -> i64;
    /// Narrow an averaged value back to the sample type (truncating cast).
    fn from_i64(value: i64) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn to_i64(self) -> i64 {
                    self as i64
                }

                fn from_i64(value: i64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_sample!(i8, u8, i16, u16, i32, u32);

/// Division rounding half away from zero.
fn div_round(x: i64, y: i64) -> i64 {
    if x == 0 {
        0
    } else if x > 0 {
        (x + y / 2) / y
    } else {
        (x - y / 2) / y
    }
}

/// Circular buffer of raw samples with a rounded arithmetic mean.
///
/// Until the buffer has wrapped once, only the samples written since the last
/// reset are averaged. After that the average covers the whole window and each
/// new sample overwrites the oldest.
#[derive(Debug, Clone)]
pub struct Averager<T: Sample> {
    data: Vec<T>,
    write: usize,
    full: bool,
}

impl<T: Sample> Averager<T> {
    /// Create an empty averager holding `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self, DataError> {
        if capacity == 0 {
            return Err(DataError::InvalidConfiguration(
                "averager capacity must be at least 1",
            ));
        }

        Ok(Self {
            data: vec![T::default(); capacity],
            write: 0,
            full: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Add a sample, overwriting the oldest once the window has wrapped.
    pub fn new_data(&mut self, sample: T) {
        let max_index = self.data.len() - 1;
        self.data[self.write] = sample;
        self.full |= self.write == max_index;
        self.write = if self.write < max_index {
            self.write + 1
        } else {
            0
        };
    }

    /// Number of samples included in the next average.
    pub fn len(&self) -> usize {
        if self.full {
            self.data.len()
        } else {
            self.write
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once `capacity` samples have been written since the last reset.
    pub fn full(&self) -> bool {
        self.full
    }

    /// Rounded mean of the valid samples, or 0 when there are none.
    pub fn average(&self) -> T {
        T::from_i64(self.average_i64())
    }

    fn average_i64(&self) -> i64 {
        let count = self.len();
        if count == 0 {
            return 0;
        }

        let sum: i64 = self.data[..count].iter().map(|s| s.to_i64()).sum();
        div_round(sum, count as i64)
    }

    /// Reset the averager.
    ///
    /// With `Some(value)` every slot is filled with `value` and the averager is
    /// marked full, so the average is immediately `value`. With `None` the
    /// averager is emptied and the filled slots no longer count.
    pub fn reset(&mut self, value: Option<T>) {
        self.data.fill(value.unwrap_or_default());
        self.write = 0;
        self.full = value.is_some();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The rounded average of each of these sets is noted next to it.
    const S8_DATA: [i8; 20] = [
        58, -41, 103, 127, 104, -84, 80, -8, 4, -127, 50, -97, -69, 44, -57, 29, 25, 38, -101, 74,
    ];
    const U8_DATA: [u8; 20] = [
        71, 45, 228, 13, 126, 199, 250, 104, 147, 178, 143, 180, 88, 194, 123, 115, 156, 59, 70,
        248,
    ];
    const S16_DATA: [i16; 20] = [
        -3739, 22893, 7805, 17336, -11750, 28826, -2848, 32719, 3500, 14826, -14924, -2126, 13481,
        -1671, -2755, 26115, -10519, -32498, 22731, 5599,
    ];
    const U16_DATA: [u16; 20] = [
        59044, 44841, 799, 40117, 15411, 3329, 65183, 44259, 4952, 53251, 23130, 41137, 21522,
        31266, 4668, 45402, 28737, 4986, 18550, 49794,
    ];
    const S32_DATA: [i32; 20] = [
        20555, 26169, 3383, 31579, 12439, 10241, 27172, 81, 16275, 29671, 20419, 9156, 18084,
        13494, 17657, 28744, 27936, 30908, 2160, 17334,
    ];
    const U32_DATA: [u32; 20] = [
        247257524, 93168365, 213206737, 173374918, 130153833, 247899438, 230140165, 68239320,
        109850936, 159456795, 144173778, 261536527, 3055151, 74545759, 3605332, 212496497,
        31211219, 277576, 192502949, 149911801,
    ];

    fn filled<T: Sample>(data: &[T]) -> Averager<T> {
        let mut averager = Averager::new(data.len()).unwrap();
        for &sample in data {
            averager.new_data(sample);
        }
        averager
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            Averager::<i32>::new(0),
            Err(DataError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_running_average_of_full_window() {
        assert_eq!(filled(&S8_DATA).average(), 8);
        assert_eq!(filled(&U8_DATA).average(), 137);
        assert_eq!(filled(&S16_DATA).average(), 5650);
        assert_eq!(filled(&U16_DATA).average(), 30019);
        assert_eq!(filled(&S32_DATA).average(), 18173);
        assert_eq!(filled(&U32_DATA).average(), 137303231);
    }

    #[test]
    fn test_average_before_any_data_is_zero() {
        let averager = Averager::<i16>::new(20).unwrap();
        assert_eq!(averager.average(), 0);
        assert!(!averager.full());
        assert!(averager.is_empty());
    }

    #[test]
    fn test_partial_window_averages_written_samples_only() {
        let mut averager = Averager::<i32>::new(10).unwrap();
        averager.new_data(10);
        averager.new_data(21);
        averager.new_data(30);
        // (10 + 21 + 30) / 3 = 20.33
        assert_eq!(averager.average(), 20);
        assert_eq!(averager.len(), 3);
        assert!(!averager.full());
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let mut averager = Averager::<i32>::new(2).unwrap();
        averager.new_data(1);
        averager.new_data(2);
        assert_eq!(averager.average(), 2);

        averager.reset(None);
        averager.new_data(-1);
        averager.new_data(-2);
        assert_eq!(averager.average(), -2);
    }

    #[test]
    fn test_full_is_set_when_window_wraps() {
        let mut averager = Averager::<u8>::new(3).unwrap();
        averager.new_data(1);
        averager.new_data(2);
        assert!(!averager.full());
        averager.new_data(3);
        assert!(averager.full());
    }

    #[test]
    fn test_wraparound_drops_oldest_sample() {
        let mut averager = Averager::<i32>::new(4).unwrap();
        for sample in [1000, 0, 0, 0] {
            averager.new_data(sample);
        }
        assert_eq!(averager.average(), 250);

        // The fifth sample overwrites the 1000
        averager.new_data(0);
        assert_eq!(averager.average(), 0);
    }

    #[test]
    fn test_reset_to_value() {
        let mut s8 = Averager::<i8>::new(20).unwrap();
        s8.reset(Some(-10));
        assert_eq!(s8.average(), -10);
        assert!(s8.full());

        let mut u32_averager = Averager::<u32>::new(20).unwrap();
        u32_averager.reset(Some(10));
        assert_eq!(u32_averager.average(), 10);
    }

    #[test]
    fn test_reset_to_empty() {
        let mut averager = filled(&S16_DATA);
        averager.reset(None);
        assert_eq!(averager.average(), 0);
        assert!(!averager.full());

        averager.reset(None);
        assert_eq!(averager.average(), 0);
    }

    #[test]
    fn test_new_data_after_reset_to_value_mixes_with_fill() {
        let mut averager = Averager::<i32>::new(4).unwrap();
        averager.reset(Some(100));
        averager.new_data(0);
        // [0, 100, 100, 100]
        assert_eq!(averager.average(), 75);
    }
}
