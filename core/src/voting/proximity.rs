use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::math::{BearingHelper, GeoHelper};
use crate::prelude::{NavResult, Voter, VoterConfig};
use crate::sensor_interface::{Contact, VisualField};
use crate::telemetry::LogManager;
use crate::tracking::CollidableStore;
use crate::voting::ballot::CourseBallot;
use crate::voting::field::VoteField;
use crate::voting::lobes::LobeShaper;

/// Own-ship position and heading for the current decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselState {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees clockwise from north.
    pub heading: f64,
}

/// Steers away from close obstacles and towards a consistent passing side.
///
/// Ballot bearings are compass bearings. Camera bearings are relative to the bow and are
/// shifted by the vessel heading, which is taken as 0 until a vessel state is set.
pub struct ProximityVoter {
    config: VoterConfig,
    store: Arc<CollidableStore>,
    ballot: CourseBallot,
    vessel: Option<VesselState>,
    logger: LogManager,
}

impl ProximityVoter {
    pub fn new(max_votes: i16, weight: f64, store: Arc<CollidableStore>) -> Self {
        let config = VoterConfig::with_votes(max_votes, weight);
        Self {
            ballot: CourseBallot::new(config.max_votes),
            config,
            store,
            vessel: None,
            logger: LogManager::new("proximity-voter"),
        }
    }

    pub fn with_config(config: VoterConfig, store: Arc<CollidableStore>) -> NavResult<Self> {
        config.validate()?;
        Ok(Self {
            ballot: CourseBallot::new(config.max_votes),
            config,
            store,
            vessel: None,
            logger: LogManager::new("proximity-voter"),
        })
    }

    pub fn ballot(&self) -> &CourseBallot {
        &self.ballot
    }

    pub fn set_vessel_state(&mut self, state: VesselState) {
        self.vessel = Some(state);
    }

    fn heading(&self) -> i32 {
        self.vessel
            .map(|state| BearingHelper::wrap_degrees(state.heading).round() as i32)
            .unwrap_or(0)
    }

    /// Negative votes on every bearing outside `[low, high)`, nothing inside.
    pub fn avoid_outside_visual_field(&mut self, low: i32, high: i32) {
        LobeShaper::new(&self.config).blind_spot(&mut self.ballot, low, high);
    }

    pub fn bearing_avoidance_smoothed(&mut self, center: i32, relative_distance: u16) {
        LobeShaper::new(&self.config).avoidance(&mut self.ballot, center, relative_distance);
    }

    pub fn bearing_preference_smoothed(&mut self, center: i32, relative_distance: u16) {
        LobeShaper::new(&self.config).preference(&mut self.ballot, center, relative_distance);
    }

    /// Votes from the latest camera frame.
    pub fn visual_avoidance(&mut self) {
        let field = self.store.snapshot_visual_field();
        let mut votes = VoteField::new();
        self.accumulate_visual(&field, &mut votes);
        votes.commit(&mut self.ballot, self.config.weight);
    }

    /// Votes from AIS contacts inside the radius of interest. Needs a vessel state.
    pub fn contact_avoidance(&mut self) {
        let Some(vessel) = self.vessel else {
            return;
        };
        let contacts = self.store.snapshot_contacts();
        let mut votes = VoteField::new();
        self.accumulate_contacts(&contacts, &vessel, &mut votes);
        votes.commit(&mut self.ballot, self.config.weight);
    }

    fn accumulate_visual(&self, field: &VisualField, votes: &mut VoteField) {
        if field.is_empty() {
            return;
        }
        let shaper = LobeShaper::unweighted(&self.config);
        let heading = self.heading();

        shaper.blind_spot(
            votes,
            heading + i32::from(field.low_bearing_limit),
            heading + i32::from(field.high_bearing_limit),
        );
        for (bearing, distance) in field.obstructed(self.config.clear_distance) {
            let course = heading + i32::from(bearing);
            shaper.avoidance(votes, course, distance);
            shaper.preference(votes, course, distance);
        }
    }

    fn accumulate_contacts(&self, contacts: &[Contact], vessel: &VesselState, votes: &mut VoteField) {
        let shaper = LobeShaper::unweighted(&self.config);
        let radius = self.config.contact_radius_m;

        for contact in contacts.iter().filter(|contact| contact.has_position()) {
            let distance = GeoHelper::distance_m(
                vessel.latitude,
                vessel.longitude,
                contact.latitude,
                contact.longitude,
            );
            if distance >= radius {
                continue;
            }
            let bearing = GeoHelper::initial_bearing(
                vessel.latitude,
                vessel.longitude,
                contact.latitude,
                contact.longitude,
            )
            .round() as i32;
            let relative_distance = (100.0 * distance / radius).round() as u16;

            self.logger.detail(&format!(
                "contact {} at {:.0} m bearing {}",
                contact.mmsi, distance, bearing
            ));
            shaper.avoidance(votes, bearing, relative_distance);
            shaper.preference(votes, bearing, relative_distance);
        }
    }
}

impl Voter for ProximityVoter {
    fn name(&self) -> &str {
        self.logger.component()
    }

    fn max_votes(&self) -> i16 {
        self.ballot.max_votes()
    }

    fn reset(&mut self) {
        self.ballot.reset();
    }

    /// Fresh ballot from both perception sources, normalised together.
    fn vote(&mut self) -> &CourseBallot {
        self.ballot.reset();

        let field = self.store.snapshot_visual_field();
        let mut votes = VoteField::new();
        self.accumulate_visual(&field, &mut votes);
        if let Some(vessel) = self.vessel {
            let contacts = self.store.snapshot_contacts();
            self.accumulate_contacts(&contacts, &vessel, &mut votes);
        }
        votes.commit(&mut self.ballot, self.config.weight);

        if !self.ballot.has_votes() {
            self.logger.detail("no fresh perception, empty ballot");
        }
        &self.ballot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const MAX_VOTES: i16 = 100;
    const WEIGHT: f64 = 1.0;
    const RANGE: i32 = 10;

    fn voter() -> (Arc<CollidableStore>, ProximityVoter) {
        let store = Arc::new(CollidableStore::default());
        let voter = ProximityVoter::new(MAX_VOTES, WEIGHT, Arc::clone(&store));
        (store, voter)
    }

    fn extremes(ballot: &CourseBallot) -> ((i32, i16), (i32, i16)) {
        let mut min = (0, ballot.max_votes());
        let mut max = (0, -ballot.max_votes());
        for bearing in 0..360 {
            let vote = ballot.get(bearing);
            if vote > max.1 {
                max = (bearing, vote);
            }
            if vote < min.1 {
                min = (bearing, vote);
            }
        }
        (min, max)
    }

    fn banded_field(obstacle: std::ops::Range<i16>) -> BTreeMap<i16, u16> {
        (-15..15)
            .map(|bearing| {
                let distance = if obstacle.contains(&bearing) { 25 } else { 100 };
                (bearing, distance)
            })
            .collect()
    }

    #[test]
    fn avoids_bearings_outside_visual_field() {
        let (_, mut voter) = voter();
        let (low, high) = (-10, 15);
        voter.avoid_outside_visual_field(low, high);
        let ballot = voter.ballot();

        for bearing in (360 + low)..360 {
            assert_eq!(ballot.get(bearing), 0);
        }
        for bearing in 0..high {
            assert_eq!(ballot.get(bearing), 0);
        }
        for bearing in high..(360 + low) {
            assert!(ballot.get(bearing) < 0, "bearing {}", bearing);
        }
    }

    #[test]
    fn avoidance_lobe_is_centered_and_monotonic() {
        let (_, mut voter) = voter();
        let center = 37;
        let distance = 5;
        voter.bearing_avoidance_smoothed(center, distance);
        let ballot = voter.ballot();

        for bearing in 0..(center - RANGE) {
            assert_eq!(ballot.get(bearing), 0);
        }
        let mut previous = 0;
        for bearing in (center - RANGE + 1)..center {
            assert!(ballot.get(bearing) < previous, "bearing {}", bearing);
            previous = ballot.get(bearing);
        }
        let expected = -1.5 * (100.0 - f64::from(distance)) * 2.0 / f64::from(RANGE);
        assert!((f64::from(ballot.get(center)) - expected).abs() <= 1.0);
        previous = ballot.get(center);
        for bearing in (center + 1)..(center + RANGE) {
            assert!(previous < ballot.get(bearing), "bearing {}", bearing);
            previous = ballot.get(bearing);
        }
        for bearing in (center + RANGE)..360 {
            assert_eq!(ballot.get(bearing), 0);
        }
    }

    #[test]
    fn preference_lobe_peaks_ninety_degrees_off() {
        let (_, mut voter) = voter();
        let center = 37;
        voter.bearing_preference_smoothed(center, 2);
        let ballot = voter.ballot();
        let lane = center + 90;

        for bearing in 0..(lane - RANGE) {
            assert_eq!(ballot.get(bearing), 0);
        }
        assert!(ballot.get(lane) > 0);
        let mut previous = 0;
        for bearing in (lane - RANGE + 1)..=lane {
            assert!(previous < ballot.get(bearing), "bearing {}", bearing);
            previous = ballot.get(bearing);
        }
        for bearing in (lane + 1)..(lane + RANGE) {
            assert!(ballot.get(bearing) < previous, "bearing {}", bearing);
            previous = ballot.get(bearing);
        }
        for bearing in (lane + RANGE)..360 {
            assert_eq!(ballot.get(bearing), 0);
        }
    }

    #[test]
    fn visual_avoidance_troughs_on_obstacle_and_prefers_passing_lane() {
        let (store, mut voter) = voter();
        store.set_visual_field(banded_field(-10..0), 0, 24);
        voter.visual_avoidance();

        let ((min_bearing, min_vote), (max_bearing, max_vote)) = extremes(voter.ballot());
        assert!((80..90).contains(&max_bearing), "max at {}", max_bearing);
        assert!((350..360).contains(&min_bearing), "min at {}", min_bearing);
        assert!(max_vote > 0);
        assert!(f64::from(min_vote) < -0.9 * f64::from(MAX_VOTES));
    }

    #[test]
    fn visual_avoidance_over_symmetric_span() {
        let (store, mut voter) = voter();
        store.set_visual_field(banded_field(-10..0), -15, 15);
        voter.visual_avoidance();

        let ((min_bearing, min_vote), (max_bearing, max_vote)) = extremes(voter.ballot());
        assert!((353..=355).contains(&min_bearing), "min at {}", min_bearing);
        assert_eq!(min_vote, -MAX_VOTES);
        assert!((82..=86).contains(&max_bearing), "max at {}", max_bearing);
        assert!(max_vote > 0 && max_vote < MAX_VOTES);
        assert!(voter.ballot().get(180) < 0);
    }

    #[test]
    fn weight_scales_normalised_visual_votes() {
        let store = Arc::new(CollidableStore::default());
        store.set_visual_field(banded_field(-10..0), -15, 15);
        let ballot_for = |weight: f64| {
            let mut voter = ProximityVoter::new(MAX_VOTES, weight, Arc::clone(&store));
            voter.visual_avoidance();
            voter.ballot().clone()
        };
        let light = ballot_for(0.25);
        let normal = ballot_for(1.0);
        let heavy = ballot_for(4.0);

        assert!(heavy.get(180) < normal.get(180), "blind spot {}", heavy.get(180));
        assert!(normal.get(180) < light.get(180));
        assert!(light.get(180) < 0);
        assert_eq!(heavy.get(354), -MAX_VOTES);
        assert!(light.get(354) > -MAX_VOTES / 2);
        assert!(heavy.get(84) > normal.get(84));
    }

    #[test]
    fn visual_avoidance_tracks_a_moved_obstacle() {
        let (store, mut voter) = voter();
        store.set_visual_field(banded_field(-10..0), 0, 24);
        voter.visual_avoidance();

        voter.reset();
        store.set_visual_field(banded_field(-15..-10), 0, 24);
        voter.visual_avoidance();

        let ((_, min_vote), (max_bearing, max_vote)) = extremes(voter.ballot());
        assert!((75..80).contains(&max_bearing), "max at {}", max_bearing);
        assert!(max_vote > 0);
        assert!(f64::from(min_vote) < -0.9 * f64::from(MAX_VOTES));
    }

    #[test]
    fn empty_store_yields_empty_ballot() {
        let (_, mut voter) = voter();
        voter.set_vessel_state(VesselState {
            latitude: 60.1,
            longitude: 19.9,
            heading: 45.0,
        });
        let ballot = voter.vote();
        assert!(!ballot.has_votes());
        assert!(ballot.iter().all(|(_, vote)| vote == 0));
    }

    #[test]
    fn heading_rotates_camera_bearings_onto_compass() {
        let (store, mut voter) = voter();
        voter.set_vessel_state(VesselState {
            latitude: 60.1,
            longitude: 19.9,
            heading: 100.0,
        });
        store.set_visual_field(BTreeMap::from([(0, 10)]), -24, 24);
        let ballot = voter.vote();

        let ((min_bearing, _), (max_bearing, _)) = extremes(ballot);
        assert_eq!(min_bearing, 100);
        assert_eq!(max_bearing, 190);
        assert_eq!(ballot.get(110), 0);
        assert!(ballot.get(130) < 0);
    }

    #[test]
    fn close_contact_repels_along_its_bearing() {
        let (store, mut voter) = voter();
        let vessel = VesselState {
            latitude: 60.1,
            longitude: 19.9,
            heading: 0.0,
        };
        let (lat, lon) = GeoHelper::destination(vessel.latitude, vessel.longitude, 45.0, 300.0);
        store.upsert_contact(230_123_456, lat, lon, 5.0, 180.0);
        store.upsert_contact_dimensions(230_999_999, 20.0, 5.0);
        voter.set_vessel_state(vessel);

        let ballot = voter.vote();
        let ((min_bearing, min_vote), (max_bearing, _)) = extremes(ballot);
        assert_eq!(min_bearing, 45);
        assert_eq!(max_bearing, 135);
        assert!(min_vote < 0);
    }

    #[test]
    fn distant_contacts_are_ignored() {
        let (store, mut voter) = voter();
        let vessel = VesselState {
            latitude: 60.1,
            longitude: 19.9,
            heading: 0.0,
        };
        let (lat, lon) = GeoHelper::destination(vessel.latitude, vessel.longitude, 90.0, 5000.0);
        store.upsert_contact(1, lat, lon, 5.0, 0.0);
        voter.set_vessel_state(vessel);
        voter.contact_avoidance();
        assert!(!voter.ballot().has_votes());
    }

    #[test]
    fn vote_starts_from_a_fresh_ballot() {
        let (store, mut voter) = voter();
        voter.bearing_avoidance_smoothed(200, 0);
        store.set_visual_field(BTreeMap::from([(0, 50)]), -24, 24);
        let ballot = voter.vote();
        assert_eq!(ballot.get(200), ballot.get(180));
        assert_eq!(voter.name(), "proximity-voter");
        assert_eq!(Voter::max_votes(&voter), MAX_VOTES);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let store = Arc::new(CollidableStore::default());
        let config = VoterConfig {
            avoidance_bearing_range: 0,
            ..Default::default()
        };
        assert!(ProximityVoter::with_config(config, store).is_err());
    }
}
