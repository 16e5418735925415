//! Job storage
//!
//! Every job owns one directory under the files root, named by its UUID.
//! Nothing else is shared between jobs, so no locking is needed.

pub mod retention;

pub use retention::{sweep_expired, spawn_sweeper};

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::types::{AppError, AppResult};

pub const BRIEF_FILE: &str = "brief.html";
pub const SCENARIOS_FILE: &str = "scenarios.csv";
pub const SOURCE_FILE: &str = "report.pdf";

/// Files a client may fetch back, with their content types.
pub const SERVED_ARTIFACTS: [(&str, &str); 2] = [
    (BRIEF_FILE, "text/html; charset=utf-8"),
    (SCENARIOS_FILE, "text/csv; charset=utf-8"),
];

pub fn content_type_for(artifact: &str) -> Option<&'static str> {
    SERVED_ARTIFACTS
        .iter()
        .find(|(name, _)| *name == artifact)
        .map(|(_, content_type)| *content_type)
}

#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
    public_base_url: String,
}

/// A freshly allocated job directory.
#[derive(Debug, Clone)]
pub struct JobDir {
    pub id: Uuid,
    pub path: PathBuf,
}

impl JobDir {
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub async fn create_job(&self) -> AppResult<JobDir> {
        let id = Uuid::new_v4();
        let path = self.root.join(id.to_string());
        fs::create_dir_all(&path).await?;
        debug!(job_id = %id, path = %path.display(), "Job directory created");
        Ok(JobDir { id, path })
    }

    pub async fn write_artifact(&self, job: &JobDir, name: &str, contents: &str) -> AppResult<PathBuf> {
        let path = job.file(name);
        fs::write(&path, contents.as_bytes()).await?;
        debug!(job_id = %job.id, file = name, bytes = contents.len(), "Artifact written");
        Ok(path)
    }

    /// Directory of an existing job. Only canonical UUIDs resolve.
    pub async fn job_path(&self, job_id: &str) -> AppResult<PathBuf> {
        let id = Uuid::parse_str(job_id)
            .map_err(|_| AppError::NotFound(format!("job {}", job_id)))?;
        if id.to_string() != job_id {
            return Err(AppError::NotFound(format!("job {}", job_id)));
        }

        let path = self.root.join(job_id);
        if fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            Ok(path)
        } else {
            Err(AppError::NotFound(format!("job {}", job_id)))
        }
    }

    /// Path of a servable artifact; anything outside `SERVED_ARTIFACTS` is not found.
    pub async fn artifact_path(&self, job_id: &str, artifact: &str) -> AppResult<PathBuf> {
        if content_type_for(artifact).is_none() {
            return Err(AppError::NotFound(format!("artifact {}", artifact)));
        }
        let path = self.job_path(job_id).await?.join(artifact);
        if fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
            Ok(path)
        } else {
            Err(AppError::NotFound(format!("artifact {}/{}", job_id, artifact)))
        }
    }

    pub fn job_url(&self, job_id: &Uuid) -> String {
        format!("{}/{}/", self.public_base_url, job_id)
    }

    pub fn artifact_url(&self, job_id: &Uuid, artifact: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, job_id, artifact)
    }
}
