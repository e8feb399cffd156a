//! The built-in operation set.

mod frames;
mod info;
mod mosaic;
mod session;

pub use frames::ExtractFramesOp;
pub use info::{FileCheck, SupportedFormatsOp, ValidateVideoOp, VideoInfoOp};
pub use mosaic::ApplyMosaicOp;
pub use session::{CreateSessionOp, ListSessionsOp, LoadAnnotationOp};

use std::path::Path;
use vmask_models::FrameSample;

use crate::error::OpsResult;

/// Copy frame artifacts out of their run-scoped store into `dir`, returning
/// samples that point at the copies. Run-scoped artifacts disappear with
/// the run; callers that hand frames to an annotator need them to outlive
/// it.
pub(crate) async fn persist_frames(
    frames: &[FrameSample],
    dir: &Path,
) -> OpsResult<Vec<FrameSample>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut persisted = Vec::with_capacity(frames.len());
    for frame in frames {
        let dest = dir.join(FrameSample::artifact_name(frame.frame_id));
        tokio::fs::copy(&frame.image_path, &dest).await?;
        persisted.push(FrameSample {
            image_path: dest,
            ..frame.clone()
        });
    }
    Ok(persisted)
}
