//! Unit Conversion Functions
//!
//! Conversions between the units sensors report and the units the
//! dashboard displays:
//! - Pressure: Pa ↔ hPa
//! - Pressure ↔ barometric altitude

/// Pascals per hectopascal
pub const PA_PER_HPA: f64 = 100.0;

/// Convert pascals to hectopascals
pub fn pa_to_hpa(pa: f64) -> f64 {
    pa / PA_PER_HPA
}

/// Convert hectopascals to pascals
pub fn hpa_to_pa(hpa: f64) -> f64 {
    hpa * PA_PER_HPA
}

/// Barometric altitude in meters for a pressure reading
///
/// Uses the international standard atmosphere formula. `sea_level_pa` is
/// the reference pressure at sea level (101325 Pa for the standard
/// atmosphere).
pub fn pressure_to_altitude(pressure_pa: f64, sea_level_pa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_pa / sea_level_pa).powf(1.0 / 5.255))
}

/// Pressure in pascals at an altitude, inverse of [`pressure_to_altitude`]
pub fn altitude_to_pressure(altitude_m: f64, sea_level_pa: f64) -> f64 {
    sea_level_pa * (1.0 - altitude_m / 44330.0).powf(5.255)
}
