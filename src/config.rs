use crate::error::{Result, ScanError};
use std::path::PathBuf;

/// Class entry whose presence marks an archive as carrying the vulnerable lookup.
pub const VULNERABLE_CLASS_ENTRY: &str = "org/apache/logging/log4j/core/lookup/JndiLookup.class";

/// Conventional build descriptor recording the packaged log4j-core version.
pub const BUILD_DESCRIPTOR_ENTRY: &str =
    "META-INF/maven/org.apache.logging.log4j/log4j-core/pom.properties";

/// System property that turns the JNDI lookup back on in versions where it
/// ships disabled.
pub const JNDI_REENABLE_FLAG: &str = "-Dlog4j2.enableJndiLookup=true";

/// Archive suffix considered during discovery and nested-entry matching.
pub const ARCHIVE_SUFFIX: &str = ".jar";

/// Substring an entry name must carry to be treated as a nested log4j archive.
pub const NESTED_NAME_HINT: &str = "log4j";

/// Maximum archive-in-archive depth the inspector will descend.
pub const MAX_NESTING_DEPTH: usize = 10;

/// Filesystem discovery root when none is configured.
pub const DEFAULT_SCAN_ROOT: &str = "/";

/// Case-insensitive archive suffix check on a path or entry name.
pub fn has_archive_suffix(name: &str) -> bool {
    let bytes = name.as_bytes();
    let suffix = ARCHIVE_SUFFIX.as_bytes();
    bytes.len() > suffix.len() && bytes[bytes.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Configuration for one scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Remove the vulnerable class from standalone suspect archives.
    pub fix: bool,
    /// Inspect only these archives, skipping discovery and the package query.
    pub explicit_archives: Vec<PathBuf>,
    /// Roots for filesystem discovery.
    pub roots: Vec<PathBuf>,
    pub scan_files: bool,
    pub scan_packages: bool,
    pub scan_processes: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fix: false,
            explicit_archives: Vec::new(),
            roots: vec![PathBuf::from(DEFAULT_SCAN_ROOT)],
            scan_files: true,
            scan_packages: true,
            scan_processes: true,
        }
    }
}

impl ScanConfig {
    /// Create a new scan configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when filesystem discovery will run.
    pub fn wants_filesystem_discovery(&self) -> bool {
        self.explicit_archives.is_empty() && self.scan_files
    }

    /// True when process-table discovery will run.
    pub fn wants_process_discovery(&self) -> bool {
        self.explicit_archives.is_empty() && self.scan_processes
    }

    /// True when the installed-package query will run.
    pub fn wants_package_query(&self) -> bool {
        self.explicit_archives.is_empty() && self.scan_packages
    }

    /// Validate the configuration and return errors for settings that would
    /// make the scan meaningless or abort mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.explicit_archives.is_empty()
            && !self.scan_files
            && !self.scan_packages
            && !self.scan_processes
        {
            return Err(ScanError::setup(
                "every scan source is skipped and no explicit archives were given",
            ));
        }

        if self.wants_filesystem_discovery() {
            for root in &self.roots {
                if !root.exists() {
                    return Err(ScanError::setup(format!(
                        "scan root does not exist: {}",
                        root.display()
                    )));
                }
            }
        }

        Ok(())
    }
}
