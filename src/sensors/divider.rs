/// Voltage at the top of a potential divider given the voltage across the
/// bottom resistor.
///
/// `r1` is the "top" resistor and `r2` the "bottom" resistor.
pub fn input_voltage(v_mid: f32, r1: f32, r2: f32) -> f32 {
    (v_mid * (r1 + r2)) / r2
}

/// Bottom resistance of a divider with known top resistor, supply and
/// midpoint voltages.
pub fn lower_resistance(upper_r: f32, v_in: f32, v_mid: f32) -> f32 {
    upper_r * (1.0 / ((v_in / v_mid) - 1.0))
}
