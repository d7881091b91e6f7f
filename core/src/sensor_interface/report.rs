use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single inbound perception message, as delivered by the sensor nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorReport {
    /// AIS position report.
    Contact {
        mmsi: u32,
        latitude: f64,
        longitude: f64,
        speed: f64,
        course: f64,
    },
    /// AIS static data report.
    ContactDimensions { mmsi: u32, length: f64, beam: f64 },
    /// Camera frame. Without an explicit span the store's default span applies.
    VisualField {
        bearings: BTreeMap<i16, u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        span: Option<(i16, i16)>,
    },
}

impl SensorReport {
    pub fn source(&self) -> &'static str {
        match self {
            SensorReport::Contact { .. } | SensorReport::ContactDimensions { .. } => "ais",
            SensorReport::VisualField { .. } => "camera",
        }
    }
}
