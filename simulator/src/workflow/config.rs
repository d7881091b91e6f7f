use crate::generator::camera::CameraConfig;
use crate::generator::traffic::TrafficConfig;
use anyhow::Context;
use navcore::{TrackingConfig, VesselState, VoterConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Decision cycles to run; 0 keeps running until stopped.
    pub cycles: usize,
    pub cycle_ms: u64,
    pub ais_period_ms: u64,
    pub camera_period_ms: u64,
    pub vessel: VesselState,
    pub tracking: TrackingConfig,
    pub voter: VoterConfig,
    pub traffic: TrafficConfig,
    pub camera: CameraConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            cycles: 10,
            cycle_ms: 500,
            ais_period_ms: 1000,
            camera_period_ms: 250,
            vessel: VesselState {
                latitude: 60.104,
                longitude: 19.922,
                heading: 0.0,
            },
            tracking: TrackingConfig::default(),
            voter: VoterConfig::default(),
            traffic: TrafficConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(cycles: usize, cycle_ms: u64, contacts: usize, seed: u64) -> Self {
        let defaults = Self::default();
        Self {
            cycles,
            cycle_ms,
            traffic: TrafficConfig {
                contacts,
                seed,
                ..defaults.traffic.clone()
            },
            ..defaults
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.tracking
            .validate()
            .context("validating tracking section")?;
        self.voter.validate().context("validating voter section")?;
        anyhow::ensure!(self.cycle_ms > 0, "cycle_ms must be non-zero");
        anyhow::ensure!(self.ais_period_ms > 0, "ais_period_ms must be non-zero");
        anyhow::ensure!(self.camera_period_ms > 0, "camera_period_ms must be non-zero");
        Ok(())
    }
}
