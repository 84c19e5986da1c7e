//! Remediation: strip the vulnerable class from standalone archives.
//!
//! The original is copied to a `.bak` sibling first and the copy verified
//! byte-for-byte; only then is the archive rewritten without the entry.
//! The backup survives a successful rewrite as the restore point.

use crate::config::VULNERABLE_CLASS_ENTRY;
use crate::error::{Result, ScanError};
use crate::report::{Classification, RemediationResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Remediate every eligible detection, recording the outcome of each
/// attempt. One failed archive never stops the rest.
///
/// Nested archives are refused: their containing archive has to be
/// rebuilt instead.
pub fn remediate_detections(detections: &[Classification]) -> Vec<RemediationResult> {
    let mut results = Vec::new();
    for class in detections.iter().filter(|c| c.is_suspect()) {
        if class.identity.is_nested() {
            warn!("{} is nested inside another archive, not rewriting", class.identity);
            continue;
        }
        if !class.is_remediation_target() {
            info!(
                "{} left in place: the version is safe unless the process flag is set",
                class.identity
            );
            continue;
        }
        results.push(remediate(Path::new(&class.identity.path)));
    }
    results
}

/// Remediate one archive in place, backup first.
pub fn remediate(path: &Path) -> RemediationResult {
    let backup = backup_path(path);
    match remediate_inner(path, &backup) {
        Ok(()) => {
            info!("Remediated {} (backup at {})", path.display(), backup.display());
            RemediationResult {
                original: path.to_path_buf(),
                backup,
                succeeded: true,
                message: None,
            }
        }
        Err(e) => {
            warn!("Remediation failed for {}: {}", path.display(), e);
            RemediationResult {
                original: path.to_path_buf(),
                backup,
                succeeded: false,
                message: Some(e.to_string()),
            }
        }
    }
}

/// `/opt/lib/app.jar` backs up to `/opt/lib/app.jar.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".bak");
    PathBuf::from(os)
}

fn remediate_inner(original: &Path, backup: &Path) -> Result<()> {
    write_verified_backup(original, backup)?;
    strip_vulnerable_entry(original)?;
    Ok(())
}

/// Copy the original beside itself and verify the copy before any rewrite
/// touches the archive.
fn write_verified_backup(original: &Path, backup: &Path) -> Result<()> {
    fs::copy(original, backup)?;
    let original_digest = sha256_file(original)?;
    let backup_digest = sha256_file(backup)?;
    if original_digest != backup_digest {
        return Err(ScanError::remediation(
            original,
            format!("backup verification failed: {original_digest} != {backup_digest}"),
        ));
    }
    debug!("Backup verified: {} ({})", backup.display(), backup_digest);
    Ok(())
}

fn sha256_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}

/// Rewrite the archive without the vulnerable entry. Every other entry is
/// copied raw, compressed bytes untouched. The replacement is written
/// beside the original so the final persist is a rename.
fn strip_vulnerable_entry(path: &Path) -> Result<()> {
    let reader = File::open(path)?;
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| ScanError::archive(path.display().to_string(), e.to_string()))?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = zip::ZipWriter::new(temp);

    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| ScanError::archive(path.display().to_string(), e.to_string()))?;
        if entry.name() == VULNERABLE_CLASS_ENTRY {
            debug!("Dropping {} from {}", entry.name(), path.display());
            continue;
        }
        writer
            .raw_copy_file(entry)
            .map_err(|e| ScanError::archive(path.display().to_string(), e.to_string()))?;
    }

    let temp = writer
        .finish()
        .map_err(|e| ScanError::archive(path.display().to_string(), e.to_string()))?;

    // Keep the original's mode across the rewrite.
    let permissions = fs::metadata(path)?.permissions();
    temp.as_file().set_permissions(permissions)?;
    temp.persist(path).map_err(|e| ScanError::remediation(path, e.to_string()))?;
    Ok(())
}
