use crate::engine::KeySchedule;
use crate::error::Result;
use crate::params::KeyFormat;
use std::path::Path;

/// Options for the schedule command
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
    pub key: String,
    pub key_format: KeyFormat,
}

/// Derive a key schedule and write it as JSON
pub fn export_schedule(output_path: &Path, options: &ScheduleOptions) -> Result<()> {
    let key = options.key_format.decode(&options.key)?;
    let schedule = KeySchedule::derive(&key)?;
    std::fs::write(output_path, schedule.to_json()?)?;
    Ok(())
}
