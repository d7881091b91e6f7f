const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle helpers on WGS84 latitude/longitude in degrees.
pub struct GeoHelper;

impl GeoHelper {
    /// Haversine distance in metres.
    pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let d_phi = (lat2 - lat1).to_radians();
        let d_lambda = (lon2 - lon1).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial bearing from the first point towards the second, degrees clockwise from north.
    pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let d_lambda = (lon2 - lon1).to_radians();

        let y = d_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
        super::BearingHelper::wrap_degrees(y.atan2(x).to_degrees())
    }

    /// Point reached by travelling `distance_m` along `bearing` from the origin.
    pub fn destination(lat: f64, lon: f64, bearing: f64, distance_m: f64) -> (f64, f64) {
        let phi1 = lat.to_radians();
        let lambda1 = lon.to_radians();
        let theta = bearing.to_radians();
        let delta = distance_m / EARTH_RADIUS_M;

        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
        (phi2.to_degrees(), lambda2.to_degrees())
    }
}
