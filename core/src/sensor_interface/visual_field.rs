use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-distance reading meaning nothing is in view at that bearing.
pub const CLEAR_DISTANCE: u16 = 100;

/// Latest frame from the forward-looking obstacle camera.
///
/// Bearings are signed degrees relative to the bow. Each reading is a normalized free
/// distance, 0 when an obstacle fills the sensor at that bearing and 100 when clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualField {
    pub bearings: BTreeMap<i16, u16>,
    pub low_bearing_limit: i16,
    pub high_bearing_limit: i16,
    pub last_updated: f64,
}

impl VisualField {
    /// Builds a frame, clamping every reading into `0..=100`.
    pub fn new(bearings: BTreeMap<i16, u16>, low: i16, high: i16, now: f64) -> Self {
        let bearings = bearings
            .into_iter()
            .map(|(bearing, distance)| (bearing, distance.min(CLEAR_DISTANCE)))
            .collect();
        Self {
            bearings,
            low_bearing_limit: low,
            high_bearing_limit: high,
            last_updated: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bearings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bearings.clear();
        self.low_bearing_limit = 0;
        self.high_bearing_limit = 0;
    }

    /// Bearings whose reading is below `clear_distance`, with their readings.
    pub fn obstructed(&self, clear_distance: u16) -> impl Iterator<Item = (i16, u16)> + '_ {
        self.bearings
            .iter()
            .filter(move |&(_, &distance)| distance < clear_distance)
            .map(|(&bearing, &distance)| (bearing, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_clamped_to_clear() {
        let field = VisualField::new(BTreeMap::from([(0, 250), (1, 40)]), -24, 24, 0.0);
        assert_eq!(field.bearings[&0], CLEAR_DISTANCE);
        assert_eq!(field.bearings[&1], 40);
    }

    #[test]
    fn clear_resets_span() {
        let mut field = VisualField::new(BTreeMap::from([(0, 10)]), -24, 24, 0.0);
        field.clear();
        assert!(field.is_empty());
        assert_eq!((field.low_bearing_limit, field.high_bearing_limit), (0, 0));
    }

    #[test]
    fn obstructed_skips_clear_bearings() {
        let field = VisualField::new(BTreeMap::from([(-2, 100), (-1, 30), (0, 99)]), -5, 5, 0.0);
        let blocked: Vec<_> = field.obstructed(CLEAR_DISTANCE).collect();
        assert_eq!(blocked, vec![(-1, 30), (0, 99)]);
    }
}
