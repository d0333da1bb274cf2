/// Reported for silent or empty windows.
pub const POWER_FLOOR_DB: f64 = -100.0;

/// Mean-square power of a window in dB relative to one LSB squared.
pub fn power_db(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return POWER_FLOOR_DB;
    }

    let sq_sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    if sq_sum <= 0.0 {
        return POWER_FLOOR_DB;
    }
    10.0 * (sq_sum / samples.len() as f64).log10()
}
