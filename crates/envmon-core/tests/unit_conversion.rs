use envmon_core::unit_conversion::{
    altitude_to_pressure, hpa_to_pa, pa_to_hpa, pressure_to_altitude, PA_PER_HPA,
};

const SEA_LEVEL_PA: f64 = 101325.0;

#[test]
fn test_pa_to_hpa() {
    let hpa = pa_to_hpa(101325.0);
    assert_eq!(hpa, 1013.25);
}

#[test]
fn test_hpa_to_pa() {
    let pa = hpa_to_pa(1013.25);
    assert_eq!(pa, 101325.0);
}

#[test]
fn test_pressure_units_invert() {
    for pa in [0.0, 850.5, 84_000.0, 101_325.0, 103_000.0] {
        assert!((hpa_to_pa(pa_to_hpa(pa)) - pa).abs() < 1e-9);
    }
    assert_eq!(PA_PER_HPA, 100.0);
}

#[test]
fn test_sea_level_altitude_is_zero() {
    let altitude = pressure_to_altitude(SEA_LEVEL_PA, SEA_LEVEL_PA);
    assert_eq!(altitude, 0.0);
}

#[test]
fn test_altitude_rises_as_pressure_falls() {
    let low = pressure_to_altitude(95_000.0, SEA_LEVEL_PA);
    let high = pressure_to_altitude(85_000.0, SEA_LEVEL_PA);
    assert!(low > 0.0);
    assert!(high > low);
}

#[test]
fn test_altitude_to_pressure_inverts() {
    for altitude in [0.0, 250.0, 1520.0, 3000.0] {
        let pressure = altitude_to_pressure(altitude, SEA_LEVEL_PA);
        let back = pressure_to_altitude(pressure, SEA_LEVEL_PA);
        assert!((back - altitude).abs() < 1e-6, "{} -> {} -> {}", altitude, pressure, back);
    }
}

#[test]
fn test_station_pressure_near_reference() {
    // About 843.5 hPa at 1520 m in the standard atmosphere
    let hpa = pa_to_hpa(altitude_to_pressure(1520.0, SEA_LEVEL_PA));
    assert!((hpa - 843.5).abs() < 0.1, "got {}", hpa);
}
