use crate::generator::camera::CameraGenerator;
use crate::generator::traffic::TrafficGenerator;
use crate::workflow::config::WorkflowConfig;
use crate::workflow::report::{append_records, CycleRecord};
use anyhow::{anyhow, Context};
use log::{info, warn};
use navcore::telemetry::Counters;
use navcore::{CollidableStore, CourseBallot, ProximityVoter, SensorReport, Voter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const STOP_POLL: Duration = Duration::from_millis(10);

pub struct WorkflowResult {
    pub records: Vec<CycleRecord>,
    pub counters: Counters,
}

/// Sums ballots sharing one scale and picks the course with the most votes.
///
/// Returns no course when nothing voted, so the helm can hold its last course.
pub fn combine(ballots: &[&CourseBallot], max_votes: i16) -> (CourseBallot, Option<u16>) {
    let total = CourseBallot::sum(ballots, max_votes);
    let course = total.has_votes().then(|| total.best_bearing());
    (total, course)
}

// Sleeps for `period` in short slices; returns false if asked to stop meanwhile.
fn sleep_unless_stopped(period: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + period;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}

fn spawn_ingest<F>(
    name: &str,
    store: Arc<CollidableStore>,
    stop: Arc<AtomicBool>,
    period: Duration,
    mut next_reports: F,
) -> anyhow::Result<JoinHandle<()>>
where
    F: FnMut() -> Vec<SensorReport> + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            while sleep_unless_stopped(period, &stop) {
                for report in next_reports() {
                    store.apply(report);
                }
            }
        })
        .with_context(|| format!("spawning {} thread", name))
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    report_path: Option<PathBuf>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            report_path: None,
        }
    }

    pub fn with_report(mut self, path: PathBuf) -> Self {
        self.report_path = Some(path);
        self
    }

    /// Runs ingest threads, the reaper and the decision loop until the configured
    /// number of cycles completes or `stop` is raised.
    pub fn execute(&self, stop: Arc<AtomicBool>) -> anyhow::Result<WorkflowResult> {
        let store = Arc::new(
            CollidableStore::new(self.config.tracking.clone())
                .context("building collidable store")?,
        );
        let mut voter = ProximityVoter::with_config(self.config.voter.clone(), Arc::clone(&store))
            .context("building proximity voter")?;
        voter.set_vessel_state(self.config.vessel);
        let reaper = store.run_default_reaper().context("starting reaper")?;

        let mut traffic = TrafficGenerator::new(&self.config.traffic, &self.config.vessel);
        let mut camera = CameraGenerator::new(self.config.camera.clone());
        for report in traffic.reports() {
            store.apply(report);
        }
        store.apply(camera.next_frame());
        info!("seeded {} contacts and one camera frame", traffic.len());

        let ais_period = Duration::from_millis(self.config.ais_period_ms);
        let ais_seconds = ais_period.as_secs_f64();
        let ais_ingest = spawn_ingest(
            "ais-ingest",
            Arc::clone(&store),
            Arc::clone(&stop),
            ais_period,
            move || traffic.advance(ais_seconds),
        )?;
        let camera_ingest = match spawn_ingest(
            "camera-ingest",
            Arc::clone(&store),
            Arc::clone(&stop),
            Duration::from_millis(self.config.camera_period_ms),
            move || vec![camera.next_frame()],
        ) {
            Ok(handle) => handle,
            Err(err) => {
                stop.store(true, Ordering::SeqCst);
                let _ = ais_ingest.join();
                return Err(err);
            }
        };

        let records = self.decide(&mut voter, &store, &stop);

        stop.store(true, Ordering::SeqCst);
        for handle in [ais_ingest, camera_ingest] {
            handle
                .join()
                .map_err(|_| anyhow!("ingest thread panicked"))?;
        }
        reaper.stop().context("stopping reaper")?;

        Ok(WorkflowResult {
            records,
            counters: store.metrics(),
        })
    }

    fn decide(
        &self,
        voter: &mut ProximityVoter,
        store: &CollidableStore,
        stop: &AtomicBool,
    ) -> Vec<CycleRecord> {
        let period = Duration::from_millis(self.config.cycle_ms);
        let mut records = Vec::new();
        let mut cycle = 0;

        while !stop.load(Ordering::SeqCst) && (self.config.cycles == 0 || cycle < self.config.cycles)
        {
            let started = Instant::now();
            let max_votes = voter.max_votes();
            let (total, course) = combine(&[voter.vote()], max_votes);

            let record = CycleRecord {
                cycle,
                timestamp: store.now(),
                recommended_course: course,
                best_vote: course.map_or(0, |bearing| total.get(i32::from(bearing))),
                worst_vote: total.iter().map(|(_, vote)| vote).min().unwrap_or(0),
                live_contacts: store.contact_count(),
                visual_bearings: store.snapshot_visual_field().bearings.len(),
            };

            match record.recommended_course {
                Some(bearing) => info!(
                    "cycle {} -> course {} ({} votes), {} contacts",
                    cycle, bearing, record.best_vote, record.live_contacts
                ),
                None => info!("cycle {} -> no votes, holding course", cycle),
            }
            if let Some(path) = &self.report_path {
                if let Err(err) = append_records(path, std::slice::from_ref(&record)) {
                    warn!("report write failed: {:#}", err);
                }
            }
            records.push(record);
            cycle += 1;

            let last = self.config.cycles != 0 && cycle >= self.config.cycles;
            if !last && !sleep_unless_stopped(period.saturating_sub(started.elapsed()), stop) {
                break;
            }
        }

        records
    }
}
