pub mod ballot;
pub mod field;
pub mod lobes;
pub mod proximity;

pub use ballot::{CourseBallot, BALLOT_SIZE};
pub use field::VoteField;
pub use lobes::{LobeShaper, VoteSink};
pub use proximity::{ProximityVoter, VesselState};
