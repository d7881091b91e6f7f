use serde::{Deserialize, Serialize};

/// Value carried by any numeric contact field that has not been reported yet.
pub const NOT_AVAILABLE: f64 = -2000.0;

/// A vessel tracked from AIS reports, keyed by its MMSI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub mmsi: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed over ground, knots.
    pub speed: f64,
    /// Course over ground, degrees.
    pub course: f64,
    pub length: f64,
    pub beam: f64,
    /// Seconds, in the store clock's timebase.
    pub last_updated: f64,
}

impl Contact {
    pub fn from_position(
        mmsi: u32,
        latitude: f64,
        longitude: f64,
        speed: f64,
        course: f64,
        now: f64,
    ) -> Self {
        Self {
            mmsi,
            latitude,
            longitude,
            speed,
            course,
            length: NOT_AVAILABLE,
            beam: NOT_AVAILABLE,
            last_updated: now,
        }
    }

    pub fn from_dimensions(mmsi: u32, length: f64, beam: f64, now: f64) -> Self {
        Self {
            mmsi,
            latitude: NOT_AVAILABLE,
            longitude: NOT_AVAILABLE,
            speed: NOT_AVAILABLE,
            course: NOT_AVAILABLE,
            length,
            beam,
            last_updated: now,
        }
    }

    pub fn has_position(&self) -> bool {
        self.latitude != NOT_AVAILABLE && self.longitude != NOT_AVAILABLE
    }

    pub fn has_dimensions(&self) -> bool {
        self.length != NOT_AVAILABLE && self.beam != NOT_AVAILABLE
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.last_updated
    }
}
