use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Check if the folder exists, if not, create an empty folder.
pub fn exist_or_create(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create folder: {}", path.display()))?;
    } else if !path.is_dir() {
        bail!("{} exists but is not a folder!", path.display());
    }

    Ok(())
}

/// Create a fresh staging folder under the output folder.
///
/// Generated artifacts are first written here and only copied over the final
/// outputs when their bytes differ. Concurrent runs must use distinct output
/// folders, which keeps their staging folders isolated as well.
pub fn create_staging(output_dir: &Path) -> anyhow::Result<PathBuf> {
    exist_or_create(output_dir)?;

    let staging = output_dir.join(format!(".magpie-staging-{}", std::process::id()));
    if staging.exists() {
        // leftover from an interrupted run with the same pid, safe to discard
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir(&staging)
        .with_context(|| format!("Failed to create staging folder: {}", staging.display()))?;

    Ok(staging)
}

/// Remove the staging folder and everything in it.
pub fn discard_staging(staging: &Path) {
    if staging.exists() {
        if let Err(err) = fs::remove_dir_all(staging) {
            log::warn!("Failed to remove staging folder {}: {}", staging.display(), err);
        }
    }
}

/// Summary of a reconcile pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileSummary {
    /// Files copied because the destination was missing or differed.
    pub written: usize,
    /// Files left untouched because the bytes were identical.
    pub unchanged: usize,
}

/// Copy every file from the staging folder into the output folder,
/// skipping files whose bytes already match the existing output.
///
/// Skipping identical files keeps their timestamps intact and avoids
/// spurious downstream rebuilds. The staging folder is removed afterwards.
pub fn reconcile_staging(staging: &Path, output_dir: &Path) -> anyhow::Result<ReconcileSummary> {
    exist_or_create(output_dir)?;

    let mut summary = ReconcileSummary::default();

    let mut entries = fs::read_dir(staging)?
        .collect::<Result<Vec<_>, _>>()?;
    // stable order so repeated runs log identically
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let staged = entry.path();
        if !staged.is_file() {
            continue;
        }

        let dest = output_dir.join(entry.file_name());
        if is_same_content(&staged, &dest)? {
            log::debug!("unchanged: {}", dest.display());
            summary.unchanged += 1;
        } else {
            fs::copy(&staged, &dest)
                .with_context(|| format!("Failed to write output: {}", dest.display()))?;
            log::debug!("written: {}", dest.display());
            summary.written += 1;
        }
    }

    discard_staging(staging);
    Ok(summary)
}

fn is_same_content(staged: &Path, dest: &Path) -> anyhow::Result<bool> {
    if !dest.is_file() {
        return Ok(false);
    }

    let staged_bytes = fs::read(staged)?;
    let dest_bytes = fs::read(dest)?;
    Ok(staged_bytes == dest_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_skips_identical_files() {
        let root = std::env::temp_dir().join(format!("magpie-fs-test-{}", std::process::id()));
        let output = root.join("out");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&output).unwrap();

        fs::write(output.join("a.gen.cpp"), b"same").unwrap();

        let staging = create_staging(&output).unwrap();
        fs::write(staging.join("a.gen.cpp"), b"same").unwrap();
        fs::write(staging.join("b.gen.cpp"), b"new").unwrap();

        let summary = reconcile_staging(&staging, &output).unwrap();
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.written, 1);
        assert!(!staging.exists());
        assert_eq!(fs::read(output.join("b.gen.cpp")).unwrap(), b"new");

        let _ = fs::remove_dir_all(&root);
    }
}
