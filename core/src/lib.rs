//! Perception-to-decision core for an autonomous sailing vessel.
//!
//! Sensor threads feed AIS contacts and camera frames into a shared
//! [`CollidableStore`]; each decision cycle a [`ProximityVoter`] turns a snapshot of
//! that store into a 360-slot [`CourseBallot`] for the course combiner.

pub mod math;
pub mod prelude;
pub mod sensor_interface;
pub mod telemetry;
pub mod tracking;
pub mod voting;

pub use prelude::{NavError, NavResult, TrackingConfig, Voter, VoterConfig};
pub use sensor_interface::{Contact, SensorReport, VisualField};
pub use tracking::{CollidableStore, ReaperHandle};
pub use voting::{CourseBallot, ProximityVoter, VesselState};
