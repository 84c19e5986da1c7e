//! Human-readable report rendering.
//!
//! The rendered report is the only thing written to stdout; progress and
//! warnings go to stderr through the logging layer.

use crate::report::{Classification, ScanReport};
use colored::Colorize;
use std::fmt::Write as _;

/// Render the final report.
pub fn render(report: &ScanReport) -> String {
    let mut out = String::new();

    for note in report.exempt_notes() {
        if let Some(pid) = note.pid {
            let _ = writeln!(
                out,
                "{} {} carries an exempt version; the lookup stays disabled (held open by pid {})",
                "Note:".cyan(),
                note.identity,
                pid
            );
        }
    }

    if !report.has_findings() {
        let _ = writeln!(out, "{}", "No indicators of vulnerability found.".green());
        return out;
    }

    let suspects: Vec<&Classification> = report.suspects().collect();
    if !suspects.is_empty() {
        let _ = writeln!(out, "{}", "Vulnerable archives".red().bold());
        for class in &suspects {
            let _ = writeln!(out, "  {}", describe_suspect(class));
        }
    }

    if !report.packages.is_empty() {
        let _ = writeln!(out, "{}", "Vulnerable packages".red().bold());
        for package in &report.packages {
            let _ = writeln!(out, "  {} {}", package.name, package.version);
        }
    }

    if !report.remediations.is_empty() {
        let _ = writeln!(out, "{}", "Remediation".bold());
        for result in &report.remediations {
            if result.succeeded {
                let _ = writeln!(
                    out,
                    "  {} cleaned, backup at {}",
                    result.original.display(),
                    result.backup.display()
                );
            } else {
                let reason = result.message.as_deref().unwrap_or("unknown error");
                let _ = writeln!(
                    out,
                    "  {} could not be cleaned: {}",
                    result.original.display(),
                    reason
                );
            }
        }
        if report.remediated_any() {
            let _ = writeln!(
                out,
                "{}",
                "Restart affected services so they stop using the old archive contents.".yellow()
            );
        }
    }

    out
}

fn describe_suspect(class: &Classification) -> String {
    let mut line = class.identity.to_string();
    if let Some(pid) = class.pid {
        let _ = write!(line, " (held open by pid {pid})");
    }
    if class.exempt_by_version && class.jndi_reenabled_by_flag {
        line.push_str(" [normally safe version, but the process re-enables the JNDI lookup]");
    }
    line
}
