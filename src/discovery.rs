//! Candidate discovery across the filesystem and the process table.

use crate::config::{has_archive_suffix, ScanConfig};
use crate::procs;
use crate::report::Candidate;
use crate::tools::HostCapabilities;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Collect every candidate archive the configured sources produce.
///
/// Explicit archives short-circuit discovery: the scan considers exactly
/// those paths and nothing else, resolved against the working directory.
pub fn discover_candidates(config: &ScanConfig, caps: &HostCapabilities) -> Vec<Candidate> {
    if !config.explicit_archives.is_empty() {
        return config
            .explicit_archives
            .iter()
            .map(|path| Candidate::from_filesystem(absolutize(path)))
            .collect();
    }

    let mut candidates = Vec::new();

    if config.scan_processes {
        match procs::discover(caps) {
            Ok(found) => {
                info!("Process discovery produced {} candidates", found.len());
                candidates.extend(found);
            }
            Err(e) => warn!("Process discovery failed: {}", e),
        }
    }

    if config.scan_files {
        for root in &config.roots {
            let found = walk_root(root);
            info!(
                "Filesystem discovery under {} produced {} candidates",
                root.display(),
                found.len()
            );
            candidates.extend(found);
        }
    }

    candidates
}

/// Make a path absolute without resolving symlinks; identity comparison
/// stays byte-for-byte on the spelled-out path.
fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Walk one root, collecting files with the archive suffix.
///
/// Symlinks are not followed; unreadable entries are logged and skipped.
fn walk_root(root: &Path) -> Vec<Candidate> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if has_archive_suffix(name) {
                        debug!("Found archive: {}", entry.path().display());
                        found.push(Candidate::from_filesystem(entry.path()));
                    }
                }
            }
            Err(e) => warn!("Failed to access directory entry: {}", e),
        }
    }
    found
}
