//! Session records and their state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use vmask_models::{FrameSample, RegionSet};

use crate::error::{SessionError, SessionResult};

/// Where a session is in the annotation hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Frames extracted, annotation interface not yet handed out
    #[default]
    Created,
    /// Waiting for the annotator to return regions
    AwaitingAnnotation,
    /// Regions attached, ready for mosaic processing
    Annotated,
    /// Regions were consumed by a pipeline run
    Consumed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::AwaitingAnnotation => "awaiting_annotation",
            SessionStatus::Annotated => "annotated",
            SessionStatus::Consumed => "consumed",
        }
    }

    /// True for the only legal successor of this status.
    pub fn can_advance_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Created, SessionStatus::AwaitingAnnotation)
                | (SessionStatus::AwaitingAnnotation, SessionStatus::Annotated)
                | (SessionStatus::Annotated, SessionStatus::Consumed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Consumed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One annotation session's durable state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionRecord {
    /// 8-character id, also the session's directory name
    pub session_id: String,

    /// Display name; defaults to the video's file stem
    pub session_name: String,

    /// Video the frames came from
    pub video_path: PathBuf,

    /// Frames offered for annotation
    pub frames: Vec<FrameSample>,

    /// Annotated regions; empty until the annotator returns them
    #[serde(default)]
    pub regions: RegionSet,

    #[serde(default)]
    pub status: SessionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a fresh session in the `created` state.
    pub fn new(
        video_path: impl Into<PathBuf>,
        session_name: Option<String>,
        frames: Vec<FrameSample>,
    ) -> Self {
        let video_path = video_path.into();
        let session_name = session_name.unwrap_or_else(|| default_name(&video_path));
        let now = Utc::now();

        Self {
            session_id: short_id(),
            session_name,
            video_path,
            frames,
            regions: RegionSet::default(),
            status: SessionStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    fn advance(mut self, next: SessionStatus) -> SessionResult<Self> {
        if !self.status.can_advance_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(self)
    }

    /// Hand the session out for annotation.
    pub fn open_for_annotation(self) -> SessionResult<Self> {
        self.advance(SessionStatus::AwaitingAnnotation)
    }

    /// Attach the annotator's regions and mark the session annotated.
    pub fn attach_regions(self, regions: RegionSet) -> SessionResult<Self> {
        let mut record = self.advance(SessionStatus::Annotated)?;
        record.regions = regions;
        Ok(record)
    }

    /// Mark the session's regions as used by a pipeline run.
    pub fn consume(self) -> SessionResult<Self> {
        self.advance(SessionStatus::Consumed)
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn default_name(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string())
}
