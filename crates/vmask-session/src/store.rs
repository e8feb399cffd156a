//! Filesystem-backed session store.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use vmask_models::RegionSet;

use crate::error::{SessionError, SessionResult};
use crate::record::{SessionRecord, SessionStatus};

const SESSION_FILE: &str = "session.json";

/// Key-value store of annotation sessions, keyed by session id.
///
/// Layout: `{root}/{session_id}/session.json`. Writes go through a temp
/// file and rename, so a crashed writer never leaves a torn record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_file(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id).join(SESSION_FILE)
    }

    /// Persist a record, creating its directory as needed.
    pub async fn save(&self, record: &SessionRecord) -> SessionResult<()> {
        let dir = self.root.join(&record.session_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(SESSION_FILE);
        let tmp = dir.join(format!("{SESSION_FILE}.tmp"));

        let json = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &path).await?;

        debug!(session_id = %record.session_id, status = %record.status, "Session saved");
        Ok(())
    }

    /// Load a record by id.
    pub async fn load(&self, session_id: &str) -> SessionResult<SessionRecord> {
        let path = self.session_file(session_id);
        if !path.exists() {
            return Err(SessionError::not_found(session_id));
        }

        let bytes = fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// All readable sessions under the store root. Unreadable or torn
    /// entries are skipped, not fatal.
    pub async fn list(&self) -> SessionResult<Vec<SessionRecord>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            match self.load(&id).await {
                Ok(record) => sessions.push(record),
                Err(e) => {
                    warn!(session_id = %id, error = %e, "Skipping unreadable session");
                }
            }
        }

        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }

    /// Regions of an annotated session, ready for mosaic processing.
    ///
    /// Sessions still waiting on the annotator (or already consumed) yield
    /// [`SessionError::NotAnnotated`].
    pub async fn load_regions(&self, session_id: &str) -> SessionResult<RegionSet> {
        let record = self.load(session_id).await?;
        if record.status != SessionStatus::Annotated {
            return Err(SessionError::not_annotated(session_id));
        }
        Ok(record.regions)
    }

    /// Advance a session's state machine and persist the result.
    pub async fn advance(
        &self,
        session_id: &str,
        transition: impl FnOnce(SessionRecord) -> SessionResult<SessionRecord>,
    ) -> SessionResult<SessionRecord> {
        let record = transition(self.load(session_id).await?)?;
        self.save(&record).await?;
        Ok(record)
    }

    /// Mark a session's regions as consumed by a pipeline run.
    pub async fn mark_consumed(&self, session_id: &str) -> SessionResult<SessionRecord> {
        self.advance(session_id, SessionRecord::consume).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vmask_models::RegionRecord;

    fn one_region() -> RegionSet {
        RegionSet {
            regions: vec![RegionRecord {
                frame_id: 1,
                object_type: "phone".to_string(),
                bbox: [10, 10, 50, 50],
                confidence: 1.0,
                description: String::new(),
                track_id: None,
            }],
        }
    }

    fn store() -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("annotations"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let (_dir, store) = store();
        let record = SessionRecord::new("/videos/a.mp4", None, Vec::new());
        let id = record.session_id.clone();

        store.save(&record).await.unwrap();
        let back = store.load(&id).await.unwrap();

        assert_eq!(back.session_id, id);
        assert_eq!(back.status, SessionStatus::Created);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store.load("deadbeef").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_regions_gated_on_annotated_state() {
        let (_dir, store) = store();
        let record = SessionRecord::new("/videos/a.mp4", None, Vec::new());
        let id = record.session_id.clone();
        store.save(&record).await.unwrap();

        // Not annotated yet
        let err = store.load_regions(&id).await.unwrap_err();
        assert!(matches!(err, SessionError::NotAnnotated(_)));

        store
            .advance(&id, |r| {
                r.open_for_annotation()?.attach_regions(one_region())
            })
            .await
            .unwrap();

        let regions = store.load_regions(&id).await.unwrap();
        assert_eq!(regions.len(), 1);

        // Consuming closes the window
        store.mark_consumed(&id).await.unwrap();
        let err = store.load_regions(&id).await.unwrap_err();
        assert!(matches!(err, SessionError::NotAnnotated(_)));
    }

    #[tokio::test]
    async fn test_list_skips_torn_entries() {
        let (_dir, store) = store();
        let a = SessionRecord::new("/videos/a.mp4", None, Vec::new());
        let b = SessionRecord::new("/videos/b.mp4", None, Vec::new());
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        // A directory with no session.json must not break listing
        fs::create_dir_all(store.root().join("broken")).await.unwrap();

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let (_dir, store) = store();
        assert!(store.list().await.unwrap().is_empty());
    }
}
