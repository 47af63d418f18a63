//! β-model NTC thermistor.

use libm::{expf, logf};

const T25C_IN_KELVIN: f32 = 298.15;
const T0C_IN_KELVIN: f32 = 273.15;

/// NTC thermistor described by its β constant and resistance at 25 °C.
///
/// `highside` records which half of the measurement divider the thermistor
/// sits in: on the high side the ADC sees the voltage across the fixed
/// resistor, on the low side the voltage across the thermistor.
#[derive(Debug, Clone, Copy)]
pub struct Thermistor {
    b: f32,
    r_inf: f32,
    highside: bool,
}

impl Thermistor {
    pub fn new(b: f32, r25: f32, highside: bool) -> Self {
        Self {
            b,
            r_inf: r25 * expf(-b / T25C_IN_KELVIN),
            highside,
        }
    }

    pub fn temperature_from_resistance(&self, r: f32) -> f32 {
        self.b / logf(r / self.r_inf) - T0C_IN_KELVIN
    }

    pub fn resistance_from_temperature(&self, celsius: f32) -> f32 {
        expf(self.b / (celsius + T0C_IN_KELVIN)) * self.r_inf
    }

    /// Temperature from a divider reading, where `other_r` is the fixed
    /// resistor and `max_reading` is the full-scale ADC value.
    ///
    /// Returns 0 °C when the reading does not give a positive resistance.
    pub fn temperature_from_adc_reading(
        &self,
        other_r: f32,
        reading: f32,
        max_reading: f32,
    ) -> f32 {
        let resistance = if self.highside {
            other_r * (max_reading - reading) / reading
        } else {
            other_r * reading / (max_reading - reading)
        };

        if resistance.is_finite() && resistance > 0.0 {
            self.temperature_from_resistance(resistance)
        } else {
            0.0
        }
    }
}
