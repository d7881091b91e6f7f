use crate::voting::ballot::{CourseBallot, BALLOT_SIZE};
use crate::voting::lobes::VoteSink;

/// Unclamped fractional votes accumulated before they are committed to a ballot.
pub struct VoteField {
    votes: [f64; BALLOT_SIZE],
}

impl VoteField {
    pub fn new() -> Self {
        Self {
            votes: [0.0; BALLOT_SIZE],
        }
    }

    pub fn peak_magnitude(&self) -> f64 {
        self.votes.iter().fold(0.0_f64, |peak, vote| peak.max(vote.abs()))
    }

    /// Rounds the field into `ballot`. An unweighted field whose strongest vote would
    /// not fit within the ballot's clamp is first scaled down uniformly; `weight` then
    /// multiplies every slot and the ballot clamps the result.
    pub fn commit(&self, ballot: &mut CourseBallot, weight: f64) {
        let limit = f64::from(ballot.max_votes());
        let peak = self.peak_magnitude();
        let scale = if peak > limit { limit / peak } else { 1.0 };
        for (bearing, &vote) in self.votes.iter().enumerate() {
            ballot.add_vote(bearing as i32, vote * scale * weight);
        }
    }
}

impl Default for VoteField {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteSink for VoteField {
    fn add_vote(&mut self, bearing: i32, value: f64) {
        self.votes[bearing.rem_euclid(BALLOT_SIZE as i32) as usize] += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_keeps_small_fields_unscaled() {
        let mut field = VoteField::new();
        field.add_vote(-2, -12.4);
        field.add_vote(40, 30.6);
        let mut ballot = CourseBallot::new(100);
        field.commit(&mut ballot, 1.0);
        assert_eq!(ballot.get(358), -12);
        assert_eq!(ballot.get(40), 31);
    }

    #[test]
    fn commit_scales_peak_to_max_votes() {
        let mut field = VoteField::new();
        field.add_vote(10, -300.0);
        field.add_vote(100, 150.0);
        assert_eq!(field.peak_magnitude(), 300.0);

        let mut ballot = CourseBallot::new(100);
        field.commit(&mut ballot, 1.0);
        assert_eq!(ballot.get(10), -100);
        assert_eq!(ballot.get(100), 50);
    }

    #[test]
    fn weight_applies_after_scaling() {
        let mut field = VoteField::new();
        field.add_vote(10, -300.0);
        field.add_vote(100, 60.0);

        let mut ballot = CourseBallot::new(100);
        field.commit(&mut ballot, 1.5);
        assert_eq!(ballot.get(10), -100);
        assert_eq!(ballot.get(100), 30);

        ballot.reset();
        field.commit(&mut ballot, 0.5);
        assert_eq!(ballot.get(10), -50);
        assert_eq!(ballot.get(100), 10);
    }

    #[test]
    fn empty_field_leaves_ballot_untouched() {
        let mut ballot = CourseBallot::new(100);
        VoteField::new().commit(&mut ballot, 2.0);
        assert!(!ballot.has_votes());
    }
}
