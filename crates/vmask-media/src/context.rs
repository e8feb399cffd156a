//! Per-run processing context.
//!
//! Every pipeline run owns a `RunContext`: its configuration, a run id for
//! log correlation, and a run-scoped temporary store for frame artifacts.
//! The artifact directory (and everything the sampler wrote into it) is
//! removed when the context is dropped. Two concurrent runs never share a
//! temp namespace.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

use crate::config::ProcessorConfig;
use crate::error::MediaResult;

/// Shared per-run state, passed by reference to each pipeline stage.
#[derive(Debug)]
pub struct RunContext {
    run_id: String,
    config: ProcessorConfig,
    temp: TempDir,
}

impl RunContext {
    /// Create a fresh context, materializing the temp and output
    /// directories.
    pub fn create(config: ProcessorConfig) -> MediaResult<Self> {
        std::fs::create_dir_all(&config.temp_dir)?;
        std::fs::create_dir_all(&config.output_dir)?;

        let temp = tempfile::Builder::new()
            .prefix("vmask-run-")
            .tempdir_in(&config.temp_dir)?;
        std::fs::create_dir_all(temp.path().join("frames"))?;

        let run_id = Uuid::new_v4().to_string();
        debug!(run_id = %run_id, temp = %temp.path().display(), "Run context created");

        Ok(Self { run_id, config, temp })
    }

    /// Unique id for this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Root of the run-scoped temporary store.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Directory holding extracted frame artifacts (`frame_{id}.jpg`).
    pub fn frames_dir(&self) -> PathBuf {
        self.temp.path().join("frames")
    }

    /// Final destination for a processed video: `{stem}_mosaic.mp4` in the
    /// configured output directory.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        self.config.output_dir.join(format!("{stem}_mosaic.mp4"))
    }
}
