//! Fixed-point to physical unit conversions.
//!
//! The sensor reports a 16-bit word whose two low bits are status bits; the
//! remaining 14 bits, left-aligned, form the signal `s` in `[0, 65536)`.
//!
//! ```text
//! T  = -46.85 + 175.72 * s / 65536   (°C)
//! RH = -6     + 125    * s / 65536   (%)
//! ```


/// Full scale of the left-aligned signal.
const SIGNAL_SCALE: f32 = 65536.0;

/// Humidity drift per °C away from the reference temperature.
pub const HUMIDITY_TEMPERATURE_COEFFICIENT: f32 = -0.15;

/// Temperature at which the humidity reading needs no correction (°C).
pub const COMPENSATION_REFERENCE_C: f32 = 25.0;

/// Convert a temperature signal to °C.
#[inline]
pub fn temperature_celsius(signal: u16) -> f32 {
    -46.85 + 175.72 * signal as f32 / SIGNAL_SCALE
}

/// Convert a humidity signal to uncompensated relative humidity (%).
#[inline]
pub fn relative_humidity(signal: u16) -> f32 {
    -6.0 + 125.0 * signal as f32 / SIGNAL_SCALE
}

/// Correct a humidity reading for the sensor's temperature dependence:
/// `raw_rh + (25 - temperature_c) * -0.15`.
#[inline]
pub fn compensate_humidity(raw_rh: f32, temperature_c: f32) -> f32 {
    raw_rh + (COMPENSATION_REFERENCE_C - temperature_c) * HUMIDITY_TEMPERATURE_COEFFICIENT
}
