// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Radius of Earth used by all great-circle computations, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Diameter of Earth matching [EARTH_RADIUS], in meters.
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    // Rounding may push h slightly above 1 for antipodal points
    EARTH_DIAMETER * h.sqrt().min(1.0).asin()
}

/// Calculates the initial compass bearing (forward azimuth) when travelling
/// along a great circle from the first to the second position.
///
/// Returns degrees in the range `[0, 360)`, where 0 is north and 90 is east.
/// The bearing between two identical points is 0.
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Maps any angle in degrees into the `[0, 360)` range.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let b = degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Returns the signed smallest rotation from bearing `from` to bearing `to`,
/// in degrees within `(-180, 180]`. Positive values are clockwise
/// (a right turn), negative values are counter-clockwise (a left turn).
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Calculates the shortest distance from a position to the meridian at `meridian_lon`,
/// in meters. This is a lower bound for the distance to any point with that longitude,
/// and is used to prune nearest-neighbor searches.
///
/// Returns 0 if the meridian is more than 90° of longitude away, as the closest point
/// is then one of the poles and no meaningful bound can be given cheaply.
pub fn distance_to_meridian(lat: f64, lon: f64, meridian_lon: f64) -> f64 {
    let dlon = bearing_delta(lon, meridian_lon).to_radians();
    if dlon.abs() > std::f64::consts::FRAC_PI_2 {
        return 0.0;
    }
    let s = (dlon.sin() * lat.to_radians().cos()).abs();
    EARTH_RADIUS * s.min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr, $eps:expr) => {
            assert!(
                (($a - $b).abs() < $eps),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn distance_to_self_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (21.0037, 105.8454), (-33.86, 151.21), (89.9, -179.9)] {
            assert_eq!(earth_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_known_values() {
        // One degree of latitude on a 6371 km sphere
        assert_almost_eq!(earth_distance(0.0, 0.0, 1.0, 0.0), 111_194.93, 0.01);

        // Short hop across a university campus in Hanoi
        let d = earth_distance(21.0037, 105.8454, 21.0055, 105.8490);
        assert_almost_eq!(d, 423.93, 0.01);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = earth_distance(52.2297, 21.0122, 50.0647, 19.945);
        let b = earth_distance(50.0647, 19.945, 52.2297, 21.0122);
        assert_eq!(a, b);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert_almost_eq!(initial_bearing(0.0, 0.0, 1.0, 0.0), 0.0, 1e-9);
        assert_almost_eq!(initial_bearing(0.0, 0.0, 0.0, 1.0), 90.0, 1e-9);
        assert_almost_eq!(initial_bearing(1.0, 0.0, 0.0, 0.0), 180.0, 1e-9);
        assert_almost_eq!(initial_bearing(0.0, 1.0, 0.0, 0.0), 270.0, 1e-9);
    }

    #[test]
    fn bearing_delta_wraps() {
        assert_almost_eq!(bearing_delta(350.0, 10.0), 20.0, 1e-9);
        assert_almost_eq!(bearing_delta(10.0, 350.0), -20.0, 1e-9);
        assert_almost_eq!(bearing_delta(0.0, 180.0), 180.0, 1e-9);
        assert_almost_eq!(bearing_delta(90.0, 0.0), -90.0, 1e-9);
        assert_eq!(bearing_delta(42.0, 42.0), 0.0);
    }

    #[test]
    fn meridian_distance_is_a_lower_bound() {
        let (lat, lon) = (48.0, 16.0);
        let bound = distance_to_meridian(lat, lon, 16.5);
        for &other_lat in &[47.0, 47.9, 48.0, 48.1, 49.0] {
            assert!(bound <= earth_distance(lat, lon, other_lat, 16.5));
        }
        assert_eq!(distance_to_meridian(lat, lon, lon), 0.0);
        assert_eq!(distance_to_meridian(lat, lon, lon + 120.0), 0.0);
    }
}
