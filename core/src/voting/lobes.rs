use crate::math::BearingHelper;
use crate::prelude::VoterConfig;
use crate::sensor_interface::CLEAR_DISTANCE;
use crate::voting::ballot::CourseBallot;

/// Anything a voter can write fractional per-bearing votes into.
pub trait VoteSink {
    fn add_vote(&mut self, bearing: i32, value: f64);
}

impl VoteSink for CourseBallot {
    fn add_vote(&mut self, bearing: i32, value: f64) {
        self.add(bearing, value.round() as i32);
    }
}

/// Writes the blind-spot mask and the avoidance/preference lobes, scaled by `weight`.
pub struct LobeShaper<'a> {
    config: &'a VoterConfig,
    weight: f64,
}

impl<'a> LobeShaper<'a> {
    /// Shaper applying the configured voter weight.
    pub fn new(config: &'a VoterConfig) -> Self {
        Self {
            config,
            weight: config.weight,
        }
    }

    /// Shaper writing raw contributions; the weight is applied later by `VoteField::commit`.
    pub fn unweighted(config: &'a VoterConfig) -> Self {
        Self {
            config,
            weight: 1.0,
        }
    }

    /// Unweighted lobe height for a free-distance reading.
    pub fn peak(&self, relative_distance: u16) -> f64 {
        let closeness = f64::from(CLEAR_DISTANCE - relative_distance.min(CLEAR_DISTANCE));
        1.5 * closeness * 2.0 / f64::from(self.config.avoidance_bearing_range)
    }

    /// Penalises every bearing outside `[low, high)`.
    pub fn blind_spot<S: VoteSink>(&self, sink: &mut S, low: i32, high: i32) {
        let penalty =
            -self.config.blind_spot_fraction * f64::from(self.config.max_votes) * self.weight;
        for bearing in 0..360 {
            if !BearingHelper::in_arc(bearing, low, high) {
                sink.add_vote(bearing, penalty);
            }
        }
    }

    pub fn avoidance<S: VoteSink>(&self, sink: &mut S, center: i32, relative_distance: u16) {
        self.lobe(sink, center, -self.peak(relative_distance));
    }

    /// Attractive lobe on the passing side, `preference_offset` degrees from `center`.
    pub fn preference<S: VoteSink>(&self, sink: &mut S, center: i32, relative_distance: u16) {
        let lane = center + i32::from(self.config.preference_offset);
        self.lobe(sink, lane, self.peak(relative_distance));
    }

    // Linear falloff reaching zero exactly `range` degrees from the center.
    fn lobe<S: VoteSink>(&self, sink: &mut S, center: i32, peak: f64) {
        let range = i32::from(self.config.avoidance_bearing_range);
        for offset in (1 - range)..range {
            let falloff = 1.0 - f64::from(offset.abs()) / f64::from(range);
            sink.add_vote(center + offset, peak * falloff * self.weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_grows_as_obstacle_closes_in() {
        let config = VoterConfig::default();
        let shaper = LobeShaper::new(&config);
        assert_eq!(shaper.peak(100), 0.0);
        assert!((shaper.peak(5) - 28.5).abs() < 1e-9);
        assert!(shaper.peak(0) > shaper.peak(50));
        assert_eq!(shaper.peak(250), 0.0);
    }

    #[test]
    fn weight_scales_every_contribution() {
        let config = VoterConfig::with_votes(100, 2.0);
        let shaper = LobeShaper::new(&config);
        let mut ballot = CourseBallot::new(100);
        shaper.avoidance(&mut ballot, 0, 50);
        assert_eq!(ballot.get(0), -30);
        assert_eq!(ballot.get(5), -15);
    }

    #[test]
    fn unweighted_shaper_ignores_weight() {
        let config = VoterConfig::with_votes(100, 2.0);
        let shaper = LobeShaper::unweighted(&config);
        let mut ballot = CourseBallot::new(100);
        shaper.avoidance(&mut ballot, 0, 50);
        assert_eq!(ballot.get(0), -15);
    }

    #[test]
    fn preference_offset_is_configurable() {
        let config = VoterConfig {
            preference_offset: -90,
            ..Default::default()
        };
        let shaper = LobeShaper::new(&config);
        let mut ballot = CourseBallot::new(100);
        shaper.preference(&mut ballot, 10, 0);
        assert_eq!(ballot.best_bearing(), 280);
    }
}
