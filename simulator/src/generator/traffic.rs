use navcore::math::GeoHelper;
use navcore::{SensorReport, VesselState};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const KNOTS_TO_MPS: f64 = 0.514_444;
const FIRST_MMSI: u32 = 230_000_001;

/// Configuration for synthetic AIS traffic around the vessel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub contacts: usize,
    pub spawn_radius_m: f64,
    pub max_speed_knots: f64,
    pub seed: u64,
    /// Fraction of contacts that also broadcast static (dimension) data.
    pub static_data_ratio: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            contacts: 6,
            spawn_radius_m: 3000.0,
            max_speed_knots: 12.0,
            seed: 0,
            static_data_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
struct SimulatedVessel {
    mmsi: u32,
    latitude: f64,
    longitude: f64,
    speed: f64,
    course: f64,
    dimensions: Option<(f64, f64)>,
}

/// Moves a seeded fleet of contacts and emits their AIS reports.
pub struct TrafficGenerator {
    fleet: Vec<SimulatedVessel>,
}

impl TrafficGenerator {
    pub fn new(config: &TrafficConfig, origin: &VesselState) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let fleet = (0..config.contacts)
            .map(|index| {
                let bearing = rng.gen_range(0.0..360.0);
                let distance = rng.gen_range(0.1..1.0) * config.spawn_radius_m;
                let (latitude, longitude) =
                    GeoHelper::destination(origin.latitude, origin.longitude, bearing, distance);
                let dimensions = if rng.gen_bool(config.static_data_ratio.clamp(0.0, 1.0)) {
                    Some((rng.gen_range(8.0..120.0), rng.gen_range(3.0..20.0)))
                } else {
                    None
                };
                SimulatedVessel {
                    mmsi: FIRST_MMSI + index as u32,
                    latitude,
                    longitude,
                    speed: rng.gen_range(0.0..=config.max_speed_knots.max(0.0)),
                    course: rng.gen_range(0.0..360.0),
                    dimensions,
                }
            })
            .collect();

        Self { fleet }
    }

    pub fn len(&self) -> usize {
        self.fleet.len()
    }

    /// Position reports for every contact, plus static data where known.
    pub fn reports(&self) -> Vec<SensorReport> {
        let mut reports = Vec::with_capacity(self.fleet.len() * 2);
        for vessel in &self.fleet {
            reports.push(SensorReport::Contact {
                mmsi: vessel.mmsi,
                latitude: vessel.latitude,
                longitude: vessel.longitude,
                speed: vessel.speed,
                course: vessel.course,
            });
            if let Some((length, beam)) = vessel.dimensions {
                reports.push(SensorReport::ContactDimensions {
                    mmsi: vessel.mmsi,
                    length,
                    beam,
                });
            }
        }
        reports
    }

    /// Dead-reckons every contact forward by `seconds` and returns fresh reports.
    pub fn advance(&mut self, seconds: f64) -> Vec<SensorReport> {
        for vessel in &mut self.fleet {
            let travelled = vessel.speed * KNOTS_TO_MPS * seconds;
            let (latitude, longitude) =
                GeoHelper::destination(vessel.latitude, vessel.longitude, vessel.course, travelled);
            vessel.latitude = latitude;
            vessel.longitude = longitude;
        }
        self.reports()
    }
}
