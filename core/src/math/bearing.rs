/// Compass arithmetic on whole and fractional degrees.
pub struct BearingHelper;

impl BearingHelper {
    /// Maps any integer bearing onto `0..360`, so `-1` and `359` coincide.
    pub fn normalize(bearing: i32) -> u16 {
        bearing.rem_euclid(360) as u16
    }

    pub fn wrap_degrees(bearing: f64) -> f64 {
        let wrapped = bearing.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    }

    /// True when `bearing` lies in the half-open arc `[low, high)` walked clockwise.
    pub fn in_arc(bearing: i32, low: i32, high: i32) -> bool {
        let width = (high - low).rem_euclid(360);
        let offset = (bearing - low).rem_euclid(360);
        offset < width
    }
}
