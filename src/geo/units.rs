use crate::error::Error;

/// A point on the Earth's surface as (latitude, longitude) in decimal degrees.
pub type LatLon = (f64, f64);

/// Earth radius in `km`, `m`, `mi`, `ft`, matching the reference implementation's constants
/// (not a single physical radius converted per-unit, so results match historical behavior exactly).
fn radius(units: &str) -> Result<f64, Error> {
    match units {
        "km" => Ok(6371.0),
        "m" => Ok(6_371_000.0),
        "mi" => Ok(3959.0),
        "ft" => Ok(3959.0 * 5280.0),
        other => Err(Error::invalid_argument(format!(
            "units must be one of \"km\", \"m\", \"mi\", \"ft\", got {:?}",
            other
        ))),
    }
}

/// Great-circle distance between two lat/lon points via the haversine formula, scaled by
/// `circuity`.
pub fn haversine(origin: LatLon, destination: LatLon, units: &str, circuity: f64) -> Result<f64, Error> {
    let r = radius(units)?;
    let (lat1, lon1) = (origin.0.to_radians(), origin.1.to_radians());
    let (lat2, lon2) = (destination.0.to_radians(), destination.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    Ok(c * r * circuity)
}

/// An equirectangular approximation of great-circle distance, cheap to compute and suitable as an
/// A* heuristic for short hops. Longitude difference is wrapped to `[0, 180]` so the heuristic
/// stays correct across the antimeridian.
pub fn cheap_ruler(origin: LatLon, destination: LatLon, units: &str, circuity: f64) -> Result<f64, Error> {
    let r = radius(units)?;
    let (lat1, lon1) = origin;
    let (lat2, lon2) = destination;
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let mut dlon = (lon2 - lon1).abs();
    if dlon > 180.0 {
        dlon = 360.0 - dlon;
    }
    let dlon = dlon.to_radians();
    let x = dlon * mean_lat.cos();
    let y = dlat;
    Ok((x * x + y * y).sqrt() * r * circuity)
}

/// Exact conversion via the reference km table `{mi: 0.621371, m: 1000, ft: 3280.84, km: 1}`.
pub fn distance_converter(distance: f64, from: &str, to: &str) -> Result<f64, Error> {
    let table = |u: &str| -> Result<f64, Error> {
        match u {
            "mi" => Ok(0.621371),
            "m" => Ok(1000.0),
            "ft" => Ok(3280.84),
            "km" => Ok(1.0),
            other => Err(Error::invalid_argument(format!(
                "units must be one of \"mi\", \"km\", \"m\", \"ft\", got {:?}",
                other
            ))),
        }
    };
    let (from_factor, to_factor) = (table(from)?, table(to)?);
    Ok((distance / from_factor) * to_factor)
}

/// `haversine(origin, destination, "km", 1) / 111`: a cheap degrees-ish bound used to size the
/// search box for auto node-addition.
pub fn lat_lon_bound_between(origin: LatLon, destination: LatLon) -> Result<f64, Error> {
    Ok(haversine(origin, destination, "km", 1.0)? / 111.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        let shanghai = (31.23, 121.47);
        let savannah = (32.08, -81.09);
        let d = haversine(shanghai, savannah, "km", 1.0).unwrap();
        assert!(d > 11_000.0 && d < 12_500.0);
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = (10.0, 10.0);
        assert_approx_eq::assert_approx_eq!(haversine(p, p, "km", 1.0).unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn test_distance_converter_round_trip() {
        for (a, b) in [
            ("km", "mi"),
            ("km", "m"),
            ("km", "ft"),
            ("mi", "m"),
            ("mi", "ft"),
            ("m", "ft"),
        ] {
            let x = 123.456;
            let round_tripped = distance_converter(distance_converter(x, a, b).unwrap(), b, a).unwrap();
            assert_approx_eq::assert_approx_eq!(round_tripped, x, 1e-6);
        }
    }

    #[test]
    fn test_distance_converter_unknown_unit() {
        assert!(distance_converter(1.0, "km", "parsecs").is_err());
    }

    #[test]
    fn test_cheap_ruler_antimeridian_wraps() {
        let a = (40.0, 179.0);
        let b = (40.0, -179.0);
        let d = cheap_ruler(a, b, "km", 1.0).unwrap();
        // should be a short hop across the antimeridian, not almost half the globe
        assert!(d < 500.0);
    }
}
