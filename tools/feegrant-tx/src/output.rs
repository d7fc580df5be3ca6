use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use feegrant_reconciler::BatchOutcome;

/// What happened to the `--output` file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Published {
    Written,
    /// Nothing to do; an unsigned transaction from an earlier run was deleted.
    RemovedStale,
    NothingToDo,
}

/// Make `path` reflect this run only: the new transaction, or no file at all.
///
/// A leftover transaction from a previous run must never survive a run that found nothing to do,
/// or it could be signed and broadcast a second time.
pub fn publish_outcome(path: &Path, outcome: &BatchOutcome) -> Result<Published> {
    match outcome {
        BatchOutcome::Transaction(tx) => {
            let rendered =
                serde_json::to_string_pretty(tx).context("failed serialising transaction JSON")?;
            replace_file(path, rendered.as_bytes())?;
            Ok(Published::Written)
        }
        BatchOutcome::NothingToDo => match fs::remove_file(path) {
            Ok(()) => Ok(Published::RemovedStale),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Published::NothingToDo),
            Err(e) => {
                Err(e).with_context(|| format!("failed removing stale {}", path.display()))
            }
        },
    }
}

/// Write through a sibling `.tmp` file and rename, so readers never see half a transaction.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("failed creating directory {}", parent.display()))?;

    let tmp = tmp_path_for(path);
    fs::write(&tmp, contents)
        .with_context(|| format!("failed writing temp file {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed replacing {}", path.display()))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
