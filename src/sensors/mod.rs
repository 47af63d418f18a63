//! Sensor front-end maths used by the channel conversions.
//!
//! These are pure functions of a reading and the channel's component values;
//! they hold no state and never touch hardware.

pub mod divider;
pub mod thermistor;

pub use thermistor::Thermistor;
