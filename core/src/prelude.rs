use serde::{Deserialize, Serialize};

use crate::voting::CourseBallot;

/// Timing parameters for the collidable store and its reaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub contact_timeout_s: f64,
    pub visual_field_timeout_s: f64,
    pub reaper_period_ms: u64,
    pub default_low_bearing: i16,
    pub default_high_bearing: i16,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            contact_timeout_s: 600.0,
            visual_field_timeout_s: 120.0,
            reaper_period_ms: 1000,
            default_low_bearing: -24,
            default_high_bearing: 24,
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> NavResult<()> {
        if self.contact_timeout_s <= 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "contact timeout must be positive, got {}",
                self.contact_timeout_s
            )));
        }
        if self.visual_field_timeout_s <= 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "visual field timeout must be positive, got {}",
                self.visual_field_timeout_s
            )));
        }
        if self.reaper_period_ms == 0 {
            return Err(NavError::InvalidConfig("reaper period must be non-zero".into()));
        }
        if self.default_low_bearing > self.default_high_bearing {
            return Err(NavError::InvalidConfig(format!(
                "default span [{}, {}] is inverted",
                self.default_low_bearing, self.default_high_bearing
            )));
        }
        Ok(())
    }
}

/// Shape of the contributions a proximity voter writes into its ballot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoterConfig {
    pub max_votes: i16,
    pub weight: f64,
    /// Half-width of every avoidance and preference lobe, in degrees.
    pub avoidance_bearing_range: u16,
    /// Offset of the preference lobe from the obstacle bearing. Positive passes the
    /// obstacle on its starboard-hand side.
    pub preference_offset: i16,
    /// Free-distance reading at or above which a bearing is considered clear.
    pub clear_distance: u16,
    /// Blind-spot penalty as a fraction of `max_votes`.
    pub blind_spot_fraction: f64,
    pub contact_radius_m: f64,
}

impl Default for VoterConfig {
    fn default() -> Self {
        Self {
            max_votes: 100,
            weight: 1.0,
            avoidance_bearing_range: 10,
            preference_offset: 90,
            clear_distance: 100,
            blind_spot_fraction: 0.2,
            contact_radius_m: 2000.0,
        }
    }
}

impl VoterConfig {
    pub fn with_votes(max_votes: i16, weight: f64) -> Self {
        Self {
            max_votes,
            weight,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> NavResult<()> {
        if self.max_votes <= 0 {
            return Err(NavError::InvalidConfig(format!(
                "max votes must be positive, got {}",
                self.max_votes
            )));
        }
        if !(self.weight >= 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "weight must be non-negative, got {}",
                self.weight
            )));
        }
        if self.avoidance_bearing_range == 0 || self.avoidance_bearing_range >= 180 {
            return Err(NavError::InvalidConfig(format!(
                "avoidance range must be in 1..180, got {}",
                self.avoidance_bearing_range
            )));
        }
        if !(0.0..=1.0).contains(&self.blind_spot_fraction) {
            return Err(NavError::InvalidConfig(format!(
                "blind spot fraction must be in [0, 1], got {}",
                self.blind_spot_fraction
            )));
        }
        if self.contact_radius_m <= 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "contact radius must be positive, got {}",
                self.contact_radius_m
            )));
        }
        Ok(())
    }
}

/// Common error type for the navigation core.
#[derive(thiserror::Error, Debug)]
pub enum NavError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("reaper failure: {0}")]
    Reaper(String),
}

pub type NavResult<T> = Result<T, NavError>;

/// An algorithm that expresses steering preference as a course ballot.
///
/// Ballots from voters sharing the same `max_votes` scale can be summed bearing by
/// bearing by a combiner.
pub trait Voter {
    fn name(&self) -> &str;
    fn max_votes(&self) -> i16;
    fn reset(&mut self);
    fn vote(&mut self) -> &CourseBallot;
}
