use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::prelude::{NavResult, TrackingConfig};
use crate::sensor_interface::{Contact, SensorReport, VisualField};
use crate::telemetry::{Counters, LogManager, TrackingMetrics};
use crate::tracking::clock::{Clock, SystemClock};
use crate::tracking::reaper::ReaperHandle;

/// What a single reaper pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapSummary {
    pub contacts_expired: usize,
    pub visual_field_cleared: bool,
}

/// Thread-safe store of live obstacle perception.
///
/// AIS contacts and the camera's visual field live behind separate mutexes so a slow
/// frame update never stalls contact ingestion. Readers only ever get owned copies.
pub struct CollidableStore {
    contacts: Mutex<HashMap<u32, Contact>>,
    visual_field: Mutex<VisualField>,
    config: TrackingConfig,
    clock: Arc<dyn Clock>,
    metrics: TrackingMetrics,
    logger: LogManager,
}

// Critical sections are plain field assignments, so a panic elsewhere cannot leave the
// guarded data half-written.
fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CollidableStore {
    pub fn new(config: TrackingConfig) -> NavResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TrackingConfig, clock: Arc<dyn Clock>) -> NavResult<Self> {
        config.validate()?;
        Ok(Self {
            contacts: Mutex::new(HashMap::new()),
            visual_field: Mutex::new(VisualField::default()),
            config,
            clock,
            metrics: TrackingMetrics::new(),
            logger: LogManager::new("collidables"),
        })
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Inserts a contact, or refreshes position and kinematics of a known one.
    pub fn upsert_contact(&self, mmsi: u32, latitude: f64, longitude: f64, speed: f64, course: f64) {
        let now = self.clock.now();
        let created = {
            let mut contacts = guard(&self.contacts);
            match contacts.get_mut(&mmsi) {
                Some(contact) => {
                    contact.latitude = latitude;
                    contact.longitude = longitude;
                    contact.speed = speed;
                    contact.course = course;
                    contact.last_updated = now;
                    false
                }
                None => {
                    contacts.insert(
                        mmsi,
                        Contact::from_position(mmsi, latitude, longitude, speed, course, now),
                    );
                    true
                }
            }
        };

        self.metrics.record_contact_report();
        if created {
            self.logger.detail(&format!("new contact {}", mmsi));
        }
    }

    /// Records hull dimensions, creating a position-less contact if needed.
    pub fn upsert_contact_dimensions(&self, mmsi: u32, length: f64, beam: f64) {
        let now = self.clock.now();
        {
            let mut contacts = guard(&self.contacts);
            contacts
                .entry(mmsi)
                .and_modify(|contact| {
                    contact.length = length;
                    contact.beam = beam;
                })
                .or_insert_with(|| Contact::from_dimensions(mmsi, length, beam, now));
        }
        self.metrics.record_dimension_report();
    }

    /// Replaces the whole visual field with a new frame.
    pub fn set_visual_field(&self, bearings: BTreeMap<i16, u16>, low: i16, high: i16) {
        let field = VisualField::new(bearings, low, high, self.clock.now());
        *guard(&self.visual_field) = field;
        self.metrics.record_visual_frame();
    }

    /// Replaces the visual field using the configured default span.
    pub fn set_visual_field_default_span(&self, bearings: BTreeMap<i16, u16>) {
        self.set_visual_field(
            bearings,
            self.config.default_low_bearing,
            self.config.default_high_bearing,
        );
    }

    /// Routes an inbound sensor report to the matching mutator.
    pub fn apply(&self, report: SensorReport) {
        self.logger.detail(&format!("{} report", report.source()));
        match report {
            SensorReport::Contact {
                mmsi,
                latitude,
                longitude,
                speed,
                course,
            } => self.upsert_contact(mmsi, latitude, longitude, speed, course),
            SensorReport::ContactDimensions { mmsi, length, beam } => {
                self.upsert_contact_dimensions(mmsi, length, beam)
            }
            SensorReport::VisualField {
                bearings,
                span: Some((low, high)),
            } => self.set_visual_field(bearings, low, high),
            SensorReport::VisualField { bearings, span: None } => {
                self.set_visual_field_default_span(bearings)
            }
        }
    }

    /// Copy of every live contact, ordered by MMSI.
    pub fn snapshot_contacts(&self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = guard(&self.contacts).values().cloned().collect();
        contacts.sort_by_key(|contact| contact.mmsi);
        contacts
    }

    pub fn contact(&self, mmsi: u32) -> Option<Contact> {
        guard(&self.contacts).get(&mmsi).cloned()
    }

    pub fn contact_count(&self) -> usize {
        guard(&self.contacts).len()
    }

    pub fn snapshot_visual_field(&self) -> VisualField {
        guard(&self.visual_field).clone()
    }

    /// Expires contacts and the visual field once they exceed their timeouts.
    pub fn reap_once(&self) -> ReapSummary {
        let now = self.clock.now();

        let contacts_expired = {
            let mut contacts = guard(&self.contacts);
            let before = contacts.len();
            contacts.retain(|_, contact| contact.age(now) <= self.config.contact_timeout_s);
            before - contacts.len()
        };

        let visual_field_cleared = {
            let mut field = guard(&self.visual_field);
            if !field.is_empty() && now - field.last_updated > self.config.visual_field_timeout_s {
                field.clear();
                true
            } else {
                false
            }
        };

        self.metrics.record_reap(contacts_expired, visual_field_cleared);
        if contacts_expired > 0 {
            self.logger
                .record(&format!("expired {} stale contacts", contacts_expired));
        }
        if visual_field_cleared {
            self.logger.warn("visual field went stale and was cleared");
        }

        ReapSummary {
            contacts_expired,
            visual_field_cleared,
        }
    }

    /// Starts the background reaper at the given period.
    pub fn run_reaper(self: &Arc<Self>, period: Duration) -> NavResult<ReaperHandle> {
        self.logger
            .record(&format!("starting reaper every {} ms", period.as_millis()));
        ReaperHandle::spawn(Arc::downgrade(self), period)
    }

    /// Starts the background reaper at the configured period.
    pub fn run_default_reaper(self: &Arc<Self>) -> NavResult<ReaperHandle> {
        self.run_reaper(Duration::from_millis(self.config.reaper_period_ms))
    }

    pub fn metrics(&self) -> Counters {
        self.metrics.snapshot()
    }
}

impl Default for CollidableStore {
    fn default() -> Self {
        Self {
            contacts: Mutex::new(HashMap::new()),
            visual_field: Mutex::new(VisualField::default()),
            config: TrackingConfig::default(),
            clock: Arc::new(SystemClock),
            metrics: TrackingMetrics::new(),
            logger: LogManager::new("collidables"),
        }
    }
}
