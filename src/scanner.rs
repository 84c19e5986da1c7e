//! Scan orchestration: discovery, inspection, package query, remediation.

use crate::config::ScanConfig;
use crate::discovery;
use crate::error::Result;
use crate::inspect::ArchiveInspector;
use crate::packages;
use crate::remediate;
use crate::report::ScanReport;
use crate::tools::HostCapabilities;
use tracing::{debug, info, warn};

/// Sequential scan pipeline owning all accumulating state.
pub struct Scanner {
    config: ScanConfig,
    caps: HostCapabilities,
}

impl Scanner {
    /// Create a scanner after validating the configuration.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { caps: HostCapabilities::probe(), config })
    }

    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the full scan and return the accumulated report.
    ///
    /// Individual candidates degrade to warnings; only setup failures
    /// abort the run.
    pub fn run(&self) -> Result<ScanReport> {
        let mut report = ScanReport::new();
        let mut inspector = ArchiveInspector::new();

        let candidates = discovery::discover_candidates(&self.config, &self.caps);
        report.candidates_discovered = candidates.len();
        info!("Discovered {} candidate archives", candidates.len());

        for candidate in &candidates {
            match inspector.inspect(&candidate.path, candidate.pid) {
                Ok(found) => report.detections.extend(found),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Could not inspect {}: {}", candidate.path.display(), e),
            }
        }
        report.archives_inspected = inspector.inspected();

        if self.config.wants_package_query() {
            match packages::find_vulnerable_packages(&self.caps) {
                Ok(found) => report.packages = found,
                Err(e) => warn!("Package inspection failed: {}", e),
            }
        }

        if self.config.fix {
            report.remediations = remediate::remediate_detections(&report.detections);
        } else {
            debug!("Remediation not requested");
        }

        info!(
            "Scan complete: {} archives inspected, {} suspect, {} vulnerable packages",
            report.archives_inspected,
            report.suspects().count(),
            report.packages.len()
        );
        Ok(report)
    }
}
