use navcore::sensor_interface::CLEAR_DISTANCE;
use navcore::SensorReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a synthetic camera frame with one obstacle band drifting aft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub low_bearing: i16,
    pub high_bearing: i16,
    pub obstacle_low: i16,
    pub obstacle_high: i16,
    pub obstacle_distance: u16,
    /// Degrees the band slides towards port every frame.
    pub drift_per_frame: i16,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            low_bearing: -24,
            high_bearing: 24,
            obstacle_low: -4,
            obstacle_high: 4,
            obstacle_distance: 30,
            drift_per_frame: 1,
        }
    }
}

/// Readings for every bearing in `span`, `distance` inside `band` and clear elsewhere.
pub fn banded_readings(span: (i16, i16), band: (i16, i16), distance: u16) -> BTreeMap<i16, u16> {
    (span.0..span.1)
        .map(|bearing| {
            let reading = if bearing >= band.0 && bearing < band.1 {
                distance
            } else {
                CLEAR_DISTANCE
            };
            (bearing, reading)
        })
        .collect()
}

pub struct CameraGenerator {
    config: CameraConfig,
    frame: i32,
}

impl CameraGenerator {
    pub fn new(config: CameraConfig) -> Self {
        Self { config, frame: 0 }
    }

    /// Next frame; the band wraps back to its start once it leaves the span.
    pub fn next_frame(&mut self) -> SensorReport {
        let span = (self.config.low_bearing, self.config.high_bearing);
        let width = i32::from(span.1 - span.0).max(1);
        let shift = (self.frame * i32::from(self.config.drift_per_frame)).rem_euclid(width) as i16;
        let band = (
            self.config.obstacle_low - shift,
            self.config.obstacle_high - shift,
        );
        self.frame += 1;

        SensorReport::VisualField {
            bearings: banded_readings(span, band, self.config.obstacle_distance),
            span: Some(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_marks_only_obstacle_bearings() {
        let readings = banded_readings((-3, 3), (-1, 1), 25);
        assert_eq!(readings.len(), 6);
        assert_eq!(readings[&-3], 100);
        assert_eq!(readings[&-1], 25);
        assert_eq!(readings[&0], 25);
        assert_eq!(readings[&1], 100);
    }

    #[test]
    fn band_drifts_each_frame() {
        let mut camera = CameraGenerator::new(CameraConfig::default());
        let first = camera.next_frame();
        let second = camera.next_frame();
        match (first, second) {
            (
                SensorReport::VisualField { bearings: a, .. },
                SensorReport::VisualField { bearings: b, .. },
            ) => {
                assert_eq!(a[&-4], 30);
                assert_eq!(a[&-5], 100);
                assert_eq!(b[&-5], 30);
                assert_eq!(b[&3], 100);
            }
            other => panic!("unexpected frames {:?}", other),
        }
    }
}
