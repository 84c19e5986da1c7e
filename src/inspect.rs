//! Archive inspection: nested traversal, deduplication and classification.
//!
//! Every archive is inspected at most once per run, keyed by its identity.
//! Nested log4j archives are extracted to a scratch workspace and inspected
//! recursively before the containing archive itself is classified.

use crate::config::{
    has_archive_suffix, BUILD_DESCRIPTOR_ENTRY, MAX_NESTING_DEPTH, NESTED_NAME_HINT,
    VULNERABLE_CLASS_ENTRY,
};
use crate::error::{Result, ScanError};
use crate::procs;
use crate::report::{ArchiveIdentity, Classification};
use crate::version;
use memchr::memmem;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

/// Inspects archives and everything nested inside them, once each.
pub struct ArchiveInspector {
    seen: HashSet<ArchiveIdentity>,
    scratch: Option<TempDir>,
}

impl ArchiveInspector {
    pub fn new() -> Self {
        Self { seen: HashSet::new(), scratch: None }
    }

    /// Number of distinct archive identities recorded so far.
    pub fn inspected(&self) -> usize {
        self.seen.len()
    }

    /// Inspect one archive and everything nested inside it.
    ///
    /// Returns a classification for each distinct archive in the chain
    /// that carries the vulnerable class. Identities already seen in this
    /// run are skipped without a report line.
    pub fn inspect(&mut self, file: &Path, pid: Option<u32>) -> Result<Vec<Classification>> {
        let identity = ArchiveIdentity::standalone(file.to_string_lossy());
        let mut found = Vec::new();
        self.inspect_at(file, identity, pid, 0, &mut found)?;
        Ok(found)
    }

    fn inspect_at(
        &mut self,
        file: &Path,
        identity: ArchiveIdentity,
        pid: Option<u32>,
        depth: usize,
        found: &mut Vec<Classification>,
    ) -> Result<()> {
        if self.seen.contains(&identity) {
            debug!("Already inspected {}, skipping", identity);
            return Ok(());
        }
        self.seen.insert(identity.clone());
        debug!("Inspecting {}", identity);

        let reader = File::open(file)?;
        match zip::ZipArchive::new(reader) {
            Ok(mut archive) => self.inspect_zip(&mut archive, &identity, pid, depth, found),
            Err(e) => {
                warn!(
                    "{} is not readable as a zip archive ({}); falling back to a raw byte scan, nested archives will not be seen",
                    identity, e
                );
                inspect_raw(file, &identity, pid, found)
            }
        }
    }

    fn inspect_zip(
        &mut self,
        archive: &mut zip::ZipArchive<File>,
        identity: &ArchiveIdentity,
        pid: Option<u32>,
        depth: usize,
        found: &mut Vec<Classification>,
    ) -> Result<()> {
        let mut nested: Vec<String> =
            archive.file_names().filter(|n| is_nested_archive_name(n)).map(String::from).collect();
        nested.sort();

        if !nested.is_empty() && depth >= MAX_NESTING_DEPTH {
            warn!("Nesting depth limit reached at {}, not descending further", identity);
        } else {
            for entry_name in &nested {
                match self.descend(archive, entry_name, identity, pid, depth + 1, found) {
                    Ok(()) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Could not inspect {} inside {}: {}", entry_name, identity, e);
                    }
                }
            }
        }

        if archive.index_for_name(VULNERABLE_CLASS_ENTRY).is_none() {
            debug!("No vulnerable class in {}", identity);
            return Ok(());
        }

        let exempt_by_version = version_exempt(archive, identity);
        let jndi_reenabled_by_flag = pid.is_some_and(procs::has_jndi_reenable_flag);

        let classification = Classification {
            identity: identity.clone(),
            pid,
            contains_vulnerable_class: true,
            exempt_by_version,
            jndi_reenabled_by_flag,
        };
        if classification.is_suspect() {
            info!("Vulnerable archive: {}", identity);
        } else {
            info!("{} carries the class but an exempt version", identity);
        }
        found.push(classification);
        Ok(())
    }

    /// Extract a nested entry to the scratch workspace and recurse into it.
    fn descend(
        &mut self,
        archive: &mut zip::ZipArchive<File>,
        entry_name: &str,
        parent: &ArchiveIdentity,
        pid: Option<u32>,
        depth: usize,
        found: &mut Vec<Classification>,
    ) -> Result<()> {
        let mut raw = Vec::new();
        {
            let mut entry = archive
                .by_name(entry_name)
                .map_err(|e| ScanError::archive(entry_name, e.to_string()))?;
            entry.read_to_end(&mut raw)?;
        }

        let scratch = self.scratch_path()?;
        let mut temp = NamedTempFile::new_in(&scratch)?;
        temp.write_all(&raw)?;
        temp.flush()?;

        debug!("Descending into {} inside {}", entry_name, parent);
        let child = ArchiveIdentity::nested(parent.to_string(), entry_name);
        self.inspect_at(temp.path(), child, pid, depth, found)
    }

    /// Scratch workspace, created on first use and removed on drop.
    fn scratch_path(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.scratch {
            return Ok(dir.path().to_path_buf());
        }
        let dir = TempDir::new()
            .map_err(|e| ScanError::setup(format!("could not create scratch workspace: {e}")))?;
        debug!("Scratch workspace at {}", dir.path().display());
        let path = dir.path().to_path_buf();
        self.scratch = Some(dir);
        Ok(path)
    }
}

impl Default for ArchiveInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw byte scan for archives that cannot be parsed as zip. Sees the
/// vulnerable entry name anywhere in the file but cannot see nested
/// archives; the version exemption falls back to the naming convention.
fn inspect_raw(
    file: &Path,
    identity: &ArchiveIdentity,
    pid: Option<u32>,
    found: &mut Vec<Classification>,
) -> Result<()> {
    let raw = fs::read(file)?;
    if memmem::find(&raw, VULNERABLE_CLASS_ENTRY.as_bytes()).is_none() {
        debug!("No vulnerable class in {} (raw scan)", identity);
        return Ok(());
    }

    let exempt_by_version = version::version_from_archive_name(base_name(&identity.path))
        .map(version::is_exempt)
        .unwrap_or(false);
    let jndi_reenabled_by_flag = pid.is_some_and(procs::has_jndi_reenable_flag);

    info!("Vulnerable archive (raw scan): {}", identity);
    found.push(Classification {
        identity: identity.clone(),
        pid,
        contains_vulnerable_class: true,
        exempt_by_version,
        jndi_reenabled_by_flag,
    });
    Ok(())
}

/// Combined built-in exemption: the packaged build descriptor, or the
/// archive naming convention. An absent or unparsable descriptor never
/// exempts on its own.
fn version_exempt(archive: &mut zip::ZipArchive<File>, identity: &ArchiveIdentity) -> bool {
    let by_descriptor = match descriptor_version(archive) {
        Some(version) => {
            let exempt = version::is_exempt(&version);
            debug!("{} descriptor version {} (exempt: {})", identity, version, exempt);
            exempt
        }
        None => false,
    };
    let by_name = version::version_from_archive_name(base_name(&identity.path))
        .map(version::is_exempt)
        .unwrap_or(false);
    by_descriptor || by_name
}

fn descriptor_version(archive: &mut zip::ZipArchive<File>) -> Option<String> {
    let mut entry = archive.by_name(BUILD_DESCRIPTOR_ENTRY).ok()?;
    let mut body = Vec::new();
    entry.read_to_end(&mut body).ok()?;
    version::version_from_descriptor(&body)
}

/// Entry names that look like a log4j archive worth descending into.
fn is_nested_archive_name(name: &str) -> bool {
    name.contains(NESTED_NAME_HINT) && has_archive_suffix(name)
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
