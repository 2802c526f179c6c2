/// Kilometers per degree of great-circle arc.
pub const DEGREES_TO_KM: f64 = 111.0;

/// Great-circle arc between two points in degrees.
///
/// Vincenty's formula on the sphere, stable for both tiny and antipodal
/// separations.
pub fn locations_to_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let long_diff = (lon2 - lon1).to_radians();

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_lat2, cos_lat2) = lat2.sin_cos();
    let (sin_dl, cos_dl) = long_diff.sin_cos();

    let y = ((cos_lat2 * sin_dl).powi(2)
        + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dl).powi(2))
    .sqrt();
    let x = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_dl;

    y.atan2(x).to_degrees()
}

/// Distance between two points in km, using a flat 111 km per degree.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    locations_to_degrees(lat1, lon1, lat2, lon2) * DEGREES_TO_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_same_point() {
        assert!(locations_to_degrees(41.0, 29.0, 41.0, 29.0).abs() < 1e-12);
    }

    #[test]
    fn test_quarter_circle() {
        assert!((locations_to_degrees(0.0, 0.0, 0.0, 90.0) - 90.0).abs() < 1e-9);
        assert!((locations_to_degrees(0.0, 0.0, 90.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((locations_to_degrees(0.0, 0.0, 0.0, 180.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_is_111_km() {
        assert!((distance_km(0.0, 0.0, 1.0, 0.0) - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixture_stations() {
        // AA.AAA - AA.BBB close, AA.AAA - AA.CCC just above 100 km
        let ab = distance_km(41.00892, 28.97644, 40.19041, 29.06158);
        let ac = distance_km(41.00892, 28.97644, 40.07179, 29.50928);
        let bc = distance_km(40.19041, 29.06158, 40.07179, 29.50928);
        assert!(ab < 100.0 && ab > 80.0);
        assert!(ac > 100.0);
        assert!(bc < 50.0);
    }

    #[test]
    fn test_symmetric() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let (a, b) = (rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0));
            let (c, d) = (rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0));
            let there = distance_km(a, b, c, d);
            let back = distance_km(c, d, a, b);
            assert!((there - back).abs() < 1e-6);
            assert!(there >= 0.0 && there <= 180.0 * DEGREES_TO_KM + 1e-6);
        }
    }
}
