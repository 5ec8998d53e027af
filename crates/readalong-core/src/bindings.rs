use crate::estimator::{PlaybackProgress, Position};
use crate::highlight::{RenderedSentence, WordSegment, WordTag};
use crate::languages::ReadingMode;
use crate::session::{RenderedTranslation, SyncFrame, SyncSnapshot};
use crate::sync_state::SyncState;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing::info;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<()> {
    T::export_all_to(out_dir).map_err(|err| anyhow!("failed to export {}: {err}", T::name()))
}

/// Regenerate the TypeScript types of the snapshot the presentation layer
/// consumes. Stale `.ts` files in `out_dir` are removed first.
pub fn export_ts_bindings(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for entry in
        fs::read_dir(out_dir).with_context(|| format!("failed to list {}", out_dir.display()))?
    {
        let path = entry.context("failed to read entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }

    export_single_type::<ReadingMode>(out_dir)?;
    export_single_type::<SyncState>(out_dir)?;
    export_single_type::<Position>(out_dir)?;
    export_single_type::<PlaybackProgress>(out_dir)?;
    export_single_type::<WordTag>(out_dir)?;
    export_single_type::<WordSegment>(out_dir)?;
    export_single_type::<RenderedSentence>(out_dir)?;
    export_single_type::<RenderedTranslation>(out_dir)?;
    export_single_type::<SyncFrame>(out_dir)?;
    export_single_type::<SyncSnapshot>(out_dir)?;

    let index_content = r#"export type { ReadingMode } from "./ReadingMode";
export type { SyncState } from "./SyncState";
export type { Position } from "./Position";
export type { PlaybackProgress } from "./PlaybackProgress";
export type { WordTag } from "./WordTag";
export type { WordSegment } from "./WordSegment";
export type { RenderedSentence } from "./RenderedSentence";
export type { RenderedTranslation } from "./RenderedTranslation";
export type { SyncFrame } from "./SyncFrame";
export type { SyncSnapshot } from "./SyncSnapshot";
"#;
    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index_content)
        .with_context(|| format!("failed to write {}", index_path.display()))?;
    info!(path = %out_dir.display(), "Exported TypeScript bindings");
    Ok(())
}
