//! Filesystem helpers for finished outputs.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaResult, VideoProcessingError};

/// Move a finished file from its staging path to its destination.
///
/// A plain rename when both paths share a filesystem; on EXDEV the file is
/// copied to a temp name next to the destination and renamed, so the
/// destination only ever sees complete files.
pub async fn move_into_place(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(18) => {
            // EXDEV: staging dir and output dir on different filesystems
            tracing::debug!(
                "Cross-device rename, falling back to copy: {} -> {}",
                src.display(),
                dst.display()
            );

            let tmp_dst = dst.with_extension("part");
            fs::copy(src, &tmp_dst).await?;
            if let Err(e) = fs::rename(&tmp_dst, dst).await {
                let _ = fs::remove_file(&tmp_dst).await;
                return Err(VideoProcessingError::from(e));
            }
            if let Err(e) = fs::remove_file(src).await {
                tracing::warn!("Failed to remove staging file {}: {}", src.display(), e);
            }
            Ok(())
        }
        Err(e) => Err(VideoProcessingError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_into_place() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("staging.mp4");
        let dst = dir.path().join("out").join("final.mp4");

        fs::write(&src, b"encoded").await.unwrap();
        move_into_place(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"encoded");
    }

    #[tokio::test]
    async fn test_move_overwrites_stale_output() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("staging.mp4");
        let dst = dir.path().join("final.mp4");

        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        move_into_place(&src, &dst).await.unwrap();
        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }
}
