use std::path::PathBuf;

/// A discovered archive to inspect, carrying the process that held it open
/// when it came from the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pid: Option<u32>,
    pub path: PathBuf,
}

impl Candidate {
    pub fn from_filesystem<P: Into<PathBuf>>(path: P) -> Self {
        Self { pid: None, path: path.into() }
    }

    pub fn from_process<P: Into<PathBuf>>(pid: u32, path: P) -> Self {
        Self { pid: Some(pid), path: path.into() }
    }
}

/// Identity of an archive, standalone or nested inside another.
///
/// Nested identities use the entry name inside the parent; the display
/// form is `parent:entry`, chaining for deeper nesting. Comparison is
/// byte-identical, so the same file reached through different path
/// spellings counts as two archives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveIdentity {
    pub parent: Option<String>,
    pub path: String,
}

impl ArchiveIdentity {
    pub fn standalone<S: Into<String>>(path: S) -> Self {
        Self { parent: None, path: path.into() }
    }

    pub fn nested<S1: Into<String>, S2: Into<String>>(parent: S1, entry: S2) -> Self {
        Self { parent: Some(parent.into()), path: entry.into() }
    }

    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }
}

impl std::fmt::Display for ArchiveIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}:{}", parent, self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

/// Immutable classification of one archive that carries the vulnerable
/// class. Archives without the class produce no classification at all.
#[derive(Debug, Clone)]
pub struct Classification {
    pub identity: ArchiveIdentity,
    pub pid: Option<u32>,
    pub contains_vulnerable_class: bool,
    pub exempt_by_version: bool,
    pub jndi_reenabled_by_flag: bool,
}

impl Classification {
    /// A suspect carries the class and is not effectively exempt.
    pub fn is_suspect(&self) -> bool {
        self.contains_vulnerable_class && (!self.exempt_by_version || self.jndi_reenabled_by_flag)
    }

    /// Standalone non-exempt suspects are the only archives rewritten.
    /// Flag-overridden exempt archives are reported but left in place.
    pub fn is_remediation_target(&self) -> bool {
        self.contains_vulnerable_class && !self.exempt_by_version && !self.identity.is_nested()
    }
}

/// One vulnerable installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFinding {
    pub name: String,
    pub version: String,
}

/// Outcome of one remediation attempt.
#[derive(Debug, Clone)]
pub struct RemediationResult {
    pub original: PathBuf,
    pub backup: PathBuf,
    pub succeeded: bool,
    pub message: Option<String>,
}

/// Accumulated results of one scan run.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub detections: Vec<Classification>,
    pub packages: Vec<PackageFinding>,
    pub remediations: Vec<RemediationResult>,
    pub candidates_discovered: usize,
    pub archives_inspected: usize,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspects(&self) -> impl Iterator<Item = &Classification> + '_ {
        self.detections.iter().filter(|c| c.is_suspect())
    }

    /// Exempt detections held open by a process whose flag was checked.
    pub fn exempt_notes(&self) -> impl Iterator<Item = &Classification> + '_ {
        self.detections.iter().filter(|c| !c.is_suspect() && c.pid.is_some())
    }

    pub fn has_findings(&self) -> bool {
        self.suspects().next().is_some() || !self.packages.is_empty()
    }

    pub fn remediated_any(&self) -> bool {
        self.remediations.iter().any(|r| r.succeeded)
    }
}
