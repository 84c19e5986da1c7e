//! Installed-package inspection through the RPM database.

use crate::error::{Result, ScanError};
use crate::report::PackageFinding;
use crate::tools::HostCapabilities;
use crate::version;
use std::process::Command;
use tracing::{debug, info};

/// Query installed log4j packages and keep the ones that fail the gate.
///
/// Hosts without an RPM database are silently skipped.
pub fn find_vulnerable_packages(caps: &HostCapabilities) -> Result<Vec<PackageFinding>> {
    if !caps.rpm {
        debug!("rpm not available, skipping package inspection");
        return Ok(Vec::new());
    }

    let output = Command::new("rpm")
        .args(["-qa", "--qf", "%{NAME} %{EVR}\n", "*log4j*"])
        .output()
        .map_err(|e| ScanError::tool("rpm", e.to_string()))?;
    if !output.status.success() {
        return Err(ScanError::tool("rpm", String::from_utf8_lossy(&output.stderr).into_owned()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let findings = parse_query_output(&stdout);
    info!("Package query found {} vulnerable log4j packages", findings.len());
    Ok(findings)
}

/// Parse `NAME EVR` lines, keeping packages whose version fails the gate.
fn parse_query_output(output: &str) -> Vec<PackageFinding> {
    let mut findings = Vec::new();
    for line in output.lines() {
        let Some((name, evr)) = line.trim().split_once(' ') else {
            continue;
        };
        let version = version::normalize_package_version(evr.trim());
        if !version::is_exempt(version) {
            findings.push(PackageFinding {
                name: name.to_string(),
                version: version.to_string(),
            });
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affected_packages_are_kept() {
        let output = "log4j 0:2.14.1-1.el8\nlog4j-slf4j 2.15.0-3\n";
        let findings = parse_query_output(output);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0], PackageFinding { name: "log4j".to_string(), version: "2.14.1".to_string() });
        assert_eq!(findings[1], PackageFinding { name: "log4j-slf4j".to_string(), version: "2.15.0".to_string() });
    }

    #[test]
    fn test_exempt_packages_are_dropped() {
        let output = "log4j 1:2.17.0-1\nlog4j12 1.2.17-16\n";
        assert!(parse_query_output(output).is_empty());
    }

    #[test]
    fn test_unparsable_versions_are_findings() {
        // A version the gate cannot parse counts as affected.
        let findings = parse_query_output("mystery-log4j unknowable\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].version, "unknowable");
    }

    #[test]
    fn test_garbage_lines_are_ignored() {
        assert!(parse_query_output("").is_empty());
        assert!(parse_query_output("one-field-only\n\n").is_empty());
    }
}
