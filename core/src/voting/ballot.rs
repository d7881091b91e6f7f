use serde::{Deserialize, Serialize};

use crate::math::BearingHelper;

pub const BALLOT_SIZE: usize = 360;

/// One vote accumulator per whole compass degree, clamped to `±max_votes`.
///
/// Positive votes mean "steer this way", negative "avoid". Bearings are always taken
/// modulo 360 so `-1` and `359` address the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BallotRecord")]
pub struct CourseBallot {
    #[serde(with = "slots")]
    votes: [i16; BALLOT_SIZE],
    max_votes: i16,
    #[serde(skip_serializing)]
    touched: bool,
}

// Decoded slots go back through `add` so the clamp holds for untrusted input.
#[derive(Deserialize)]
struct BallotRecord {
    #[serde(with = "slots")]
    votes: [i16; BALLOT_SIZE],
    max_votes: i16,
}

impl From<BallotRecord> for CourseBallot {
    fn from(record: BallotRecord) -> Self {
        let mut ballot = CourseBallot::new(record.max_votes);
        for (bearing, &vote) in record.votes.iter().enumerate() {
            ballot.add(bearing as i32, i32::from(vote));
        }
        ballot
    }
}

impl CourseBallot {
    pub fn new(max_votes: i16) -> Self {
        Self {
            votes: [0; BALLOT_SIZE],
            max_votes: max_votes.saturating_abs(),
            touched: false,
        }
    }

    pub fn max_votes(&self) -> i16 {
        self.max_votes
    }

    /// Adds `delta` to a slot, saturating at `±max_votes`.
    pub fn add(&mut self, bearing: i32, delta: i32) {
        if delta == 0 {
            return;
        }
        let limit = i32::from(self.max_votes);
        let slot = &mut self.votes[usize::from(BearingHelper::normalize(bearing))];
        *slot = i32::from(*slot).saturating_add(delta).clamp(-limit, limit) as i16;
        self.touched = true;
    }

    pub fn get(&self, bearing: i32) -> i16 {
        self.votes[usize::from(BearingHelper::normalize(bearing))]
    }

    pub fn reset(&mut self) {
        self.votes = [0; BALLOT_SIZE];
        self.touched = false;
    }

    /// Whether any non-zero contribution has been applied since the last reset.
    pub fn has_votes(&self) -> bool {
        self.touched
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, i16)> + '_ {
        self.votes
            .iter()
            .enumerate()
            .map(|(bearing, &vote)| (bearing as u16, vote))
    }

    /// Plain per-bearing sum of `ballots`, clamped once to `±max_votes` at the end so the
    /// result does not depend on their order.
    pub fn sum(ballots: &[&CourseBallot], max_votes: i16) -> CourseBallot {
        let mut totals = [0_i32; BALLOT_SIZE];
        for ballot in ballots {
            for (total, &vote) in totals.iter_mut().zip(ballot.votes.iter()) {
                *total += i32::from(vote);
            }
        }
        let mut sum = CourseBallot::new(max_votes);
        let limit = i32::from(sum.max_votes);
        for (slot, total) in sum.votes.iter_mut().zip(totals) {
            *slot = total.clamp(-limit, limit) as i16;
        }
        sum.touched = ballots.iter().any(|ballot| ballot.has_votes());
        sum
    }

    /// Bearing with the highest vote; ties go to the lowest bearing.
    pub fn best_bearing(&self) -> u16 {
        let mut best = 0;
        for (bearing, vote) in self.iter() {
            if vote > self.votes[usize::from(best)] {
                best = bearing;
            }
        }
        best
    }
}

mod slots {
    use super::BALLOT_SIZE;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(votes: &[i16; BALLOT_SIZE], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(votes.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[i16; BALLOT_SIZE], D::Error> {
        let votes = Vec::<i16>::deserialize(deserializer)?;
        let len = votes.len();
        votes
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"360 ballot slots"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ballot_is_empty() {
        let ballot = CourseBallot::new(100);
        assert!(ballot.iter().all(|(_, vote)| vote == 0));
        assert!(!ballot.has_votes());
        assert_eq!(ballot.max_votes(), 100);
    }

    #[test]
    fn negative_bearings_wrap() {
        let mut ballot = CourseBallot::new(100);
        ballot.add(-1, 7);
        assert_eq!(ballot.get(359), 7);
        assert_eq!(ballot.get(-1), 7);
        ballot.add(719, 3);
        assert_eq!(ballot.get(359), 10);
    }

    #[test]
    fn votes_saturate_at_max() {
        let mut ballot = CourseBallot::new(100);
        for _ in 0..5 {
            ballot.add(10, 60);
        }
        assert_eq!(ballot.get(10), 100);

        ballot.add(20, i32::MIN);
        assert_eq!(ballot.get(20), -100);
        ballot.add(20, -1);
        assert_eq!(ballot.get(20), -100);
    }

    #[test]
    fn reset_clears_votes_and_flag() {
        let mut ballot = CourseBallot::new(10);
        ballot.add(5, 3);
        assert!(ballot.has_votes());
        ballot.reset();
        assert_eq!(ballot.get(5), 0);
        assert!(!ballot.has_votes());
    }

    #[test]
    fn best_bearing_breaks_ties_low() {
        let mut ballot = CourseBallot::new(100);
        ballot.add(200, 40);
        ballot.add(30, 40);
        ballot.add(-10, 39);
        assert_eq!(ballot.best_bearing(), 30);
    }

    #[test]
    fn sum_clamps_once_after_adding() {
        let mut first = CourseBallot::new(100);
        first.add(90, 70);
        let mut second = CourseBallot::new(100);
        second.add(90, 50);
        second.add(180, -20);
        let combined = CourseBallot::sum(&[&first, &second], 100);
        assert_eq!(combined.get(90), 100);
        assert_eq!(combined.get(180), -20);
        assert!(combined.has_votes());
    }

    #[test]
    fn sum_ignores_ballot_order() {
        let mut keen = CourseBallot::new(100);
        keen.add(10, 100);
        keen.add(20, 50);
        let mut veto = CourseBallot::new(100);
        veto.add(10, -100);

        let orders: [[&CourseBallot; 3]; 3] =
            [[&keen, &keen, &veto], [&veto, &keen, &keen], [&keen, &veto, &keen]];
        for order in orders {
            let combined = CourseBallot::sum(&order, 100);
            assert_eq!(combined.get(10), 100);
            assert_eq!(combined.get(20), 100);
            assert_eq!(combined.best_bearing(), 10);
        }
    }

    #[test]
    fn deserialize_clamps_out_of_range_slots() {
        let mut votes = vec![0_i16; BALLOT_SIZE];
        votes[3] = 500;
        votes[4] = -700;
        let json = serde_json::json!({ "votes": votes, "max_votes": 100, "touched": false });
        let decoded: CourseBallot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.get(3), 100);
        assert_eq!(decoded.get(4), -100);
        assert!(decoded.has_votes());

        let silent = serde_json::json!({
            "votes": vec![0_i16; BALLOT_SIZE],
            "max_votes": 100,
            "touched": true,
        });
        let decoded: CourseBallot = serde_json::from_value(silent).unwrap();
        assert!(!decoded.has_votes());
    }

    #[test]
    fn serializes_as_slot_list() {
        let mut ballot = CourseBallot::new(50);
        ballot.add(1, -4);
        let json = serde_json::to_value(&ballot).unwrap();
        assert_eq!(json["votes"].as_array().unwrap().len(), BALLOT_SIZE);
        let decoded: CourseBallot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, ballot);
    }
}
