//! Expiry of old job directories

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::JobStore;
use crate::types::AppResult;

/// Remove job directories last modified more than `max_age` before `now`.
///
/// Only entries named like a job id are considered. Returns how many were removed.
pub async fn sweep_expired(root: &Path, max_age: Duration, now: SystemTime) -> AppResult<usize> {
    let mut removed = 0;
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if Uuid::parse_str(name).is_err() {
            continue;
        }

        let Some(age) = job_age(name, entry.metadata().await, now) else {
            continue;
        };
        if age < max_age {
            continue;
        }

        match fs::remove_dir_all(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(job_id = name, error = %e, "Failed to remove expired job"),
        }
    }

    Ok(removed)
}

/// Age of a job directory. Entries that are not directories, or that vanished
/// or cannot be inspected, have none.
fn job_age(name: &str, metadata: io::Result<Metadata>, now: SystemTime) -> Option<Duration> {
    let modified = metadata.and_then(|m| if m.is_dir() { m.modified().map(Some) } else { Ok(None) });
    match modified {
        Ok(modified) => modified.map(|at| now.duration_since(at).unwrap_or(Duration::ZERO)),
        Err(e) => {
            warn!(job_id = name, error = %e, "Failed to inspect job directory, skipping");
            None
        }
    }
}

/// Periodically sweep `store`. A zero `retention` keeps jobs forever and spawns nothing.
pub fn spawn_sweeper(store: JobStore, retention: Duration, every: Duration) -> Option<JoinHandle<()>> {
    if retention.is_zero() {
        info!("Job retention disabled, artifacts are kept indefinitely");
        return None;
    }

    info!(
        retention_secs = retention.as_secs(),
        interval_secs = every.as_secs(),
        "Starting job retention sweeper"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            match sweep_expired(store.root(), retention, SystemTime::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired jobs removed"),
                Err(e) => warn!(error = %e, "Retention sweep failed"),
            }
        }
    }))
}
