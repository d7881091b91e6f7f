use anyhow::Context;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of one decision cycle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CycleRecord {
    pub cycle: usize,
    pub timestamp: f64,
    pub recommended_course: Option<u16>,
    pub best_vote: i16,
    pub worst_vote: i16,
    pub live_contacts: usize,
    pub visual_bearings: usize,
}

/// Appends one JSON line per record to `path`, creating parent directories.
pub fn append_records<P: AsRef<Path>>(path: P, records: &[CycleRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record).context("encoding cycle record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush().context("flushing report")?;
    Ok(())
}
