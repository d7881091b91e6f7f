use std::sync::Mutex;

/// Counters describing what the collidable store has ingested and expired.
pub struct TrackingMetrics {
    inner: Mutex<Counters>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub contact_reports: usize,
    pub dimension_reports: usize,
    pub visual_frames: usize,
    pub contacts_expired: usize,
    pub visual_fields_cleared: usize,
    pub reap_passes: usize,
}

impl TrackingMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn record_contact_report(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.contact_reports += 1;
        }
    }

    pub fn record_dimension_report(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.dimension_reports += 1;
        }
    }

    pub fn record_visual_frame(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.visual_frames += 1;
        }
    }

    pub fn record_reap(&self, contacts_expired: usize, visual_cleared: bool) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.reap_passes += 1;
            counters.contacts_expired += contacts_expired;
            if visual_cleared {
                counters.visual_fields_cleared += 1;
            }
        }
    }

    pub fn snapshot(&self) -> Counters {
        if let Ok(counters) = self.inner.lock() {
            *counters
        } else {
            Counters::default()
        }
    }
}

impl Default for TrackingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reap_accumulates_expiries() {
        let metrics = TrackingMetrics::new();
        metrics.record_reap(2, false);
        metrics.record_reap(1, true);
        let counters = metrics.snapshot();
        assert_eq!(counters.reap_passes, 2);
        assert_eq!(counters.contacts_expired, 3);
        assert_eq!(counters.visual_fields_cleared, 1);
    }
}
