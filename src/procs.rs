//! Process-table discovery and per-process flag inspection.
//!
//! Archives held open by running JVMs are found through `lsof` when it is
//! present, falling back to the process table via `ps`. The fallback only
//! sees archives named at the end of a command line; that loss is reported
//! as a degraded capability, not hidden.

use crate::config::{has_archive_suffix, JNDI_REENABLE_FLAG};
use crate::error::{Result, ScanError};
use crate::report::Candidate;
use crate::tools::HostCapabilities;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Discover candidate archives held open by running processes.
pub fn discover(caps: &HostCapabilities) -> Result<Vec<Candidate>> {
    if caps.lsof {
        let stdout = run_capture("lsof", &["-c", "java"])?;
        Ok(parse_lsof_output(&stdout))
    } else if caps.ps {
        warn!(
            "lsof not found, falling back to the process table; archives not named last on a command line will be missed"
        );
        let stdout = run_capture("ps", &["-e", "-o", "pid=", "-o", "args="])?;
        Ok(parse_ps_output(&stdout))
    } else {
        warn!("neither lsof nor ps is available, skipping process discovery");
        Ok(Vec::new())
    }
}

/// Run a tool and collect stdout. A non-zero exit is not an error here:
/// lsof exits non-zero when nothing matches its filter.
fn run_capture(tool: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| ScanError::tool(tool, e.to_string()))?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `lsof` table output into candidates.
///
/// Columns are COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME; only
/// rows whose NAME ends with the archive suffix are kept.
fn parse_lsof_output(output: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for line in output.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let Ok(pid) = fields[1].parse::<u32>() else {
            continue;
        };
        let name = fields[8..].join(" ");
        if has_archive_suffix(&name) {
            debug!("Process {} holds {}", pid, name);
            candidates.push(Candidate { pid: Some(pid), path: PathBuf::from(name) });
        }
    }
    candidates
}

/// Parse `ps -e -o pid= -o args=` output, keeping command lines that end
/// with an archive path.
fn parse_ps_output(output: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let Some(pid) = tokens.next().and_then(|t| t.parse::<u32>().ok()) else {
            continue;
        };
        let Some(last) = tokens.last() else {
            continue;
        };
        if has_archive_suffix(last) {
            debug!("Process {} runs {}", pid, last);
            candidates.push(Candidate { pid: Some(pid), path: PathBuf::from(last) });
        }
    }
    candidates
}

/// Check whether a process command line re-enables the JNDI lookup.
///
/// Reads `/proc/<pid>/cmdline`. Any failure (process gone, permission
/// denied) means no flag; the scan never aborts over a process check.
pub fn has_jndi_reenable_flag(pid: u32) -> bool {
    let path = format!("/proc/{pid}/cmdline");
    match std::fs::read(&path) {
        Ok(raw) => {
            let cmdline = String::from_utf8_lossy(&raw).replace('\0', " ");
            cmdline.contains(JNDI_REENABLE_FLAG)
        }
        Err(e) => {
            debug!("Could not read {}: {}", path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== lsof parsing ====================

    #[test]
    fn test_lsof_rows_with_archives_become_candidates() {
        let output = "COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF    NODE NAME\n\
                      java    41123  app  mem    REG  253,0  1743878  525132 /opt/app/lib/log4j-core-2.14.1.jar\n\
                      java    41123  app   10r   REG  253,0      123  525133 /opt/app/conf/app.properties\n\
                      java     5100  app  mem    REG  253,0    99999  525140 /srv/tool/tool.jar\n";
        let candidates = parse_lsof_output(output);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], Candidate::from_process(41123, "/opt/app/lib/log4j-core-2.14.1.jar"));
        assert_eq!(candidates[1], Candidate::from_process(5100, "/srv/tool/tool.jar"));
    }

    #[test]
    fn test_lsof_paths_with_spaces_are_rejoined() {
        let output = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\n\
                      java 7 app mem REG 253,0 1 2 /opt/my app/lib.jar\n";
        let candidates = parse_lsof_output(output);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, PathBuf::from("/opt/my app/lib.jar"));
    }

    #[test]
    fn test_lsof_garbage_lines_are_ignored() {
        assert!(parse_lsof_output("").is_empty());
        assert!(parse_lsof_output("HEADER ONLY\n").is_empty());
        assert!(parse_lsof_output("HEADER\njava notapid app mem REG 1 2 3 /a.jar\n").is_empty());
        assert!(parse_lsof_output("HEADER\nshort line\n").is_empty());
    }

    // ==================== ps parsing ====================

    #[test]
    fn test_ps_lines_ending_in_archives_become_candidates() {
        let output = "    1 /sbin/init\n\
                      4223 java -cp /opt/app/lib -jar /opt/app/server.jar\n\
                      5100 java -Dapp.env=prod /srv/tool.jar\n\
                      6000 bash /usr/local/bin/run.sh\n";
        let candidates = parse_ps_output(output);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], Candidate::from_process(4223, "/opt/app/server.jar"));
        assert_eq!(candidates[1], Candidate::from_process(5100, "/srv/tool.jar"));
    }

    #[test]
    fn test_ps_garbage_lines_are_ignored() {
        assert!(parse_ps_output("").is_empty());
        assert!(parse_ps_output("notapid java app.jar\n").is_empty());
        assert!(parse_ps_output("1234\n").is_empty());
    }

    // ==================== flag inspection ====================

    #[test]
    fn test_own_process_has_no_flag() {
        assert!(!has_jndi_reenable_flag(std::process::id()));
    }

    #[test]
    fn test_missing_process_has_no_flag() {
        assert!(!has_jndi_reenable_flag(u32::MAX));
    }

    #[test]
    fn test_flag_detected_on_running_process() {
        // The trailing `exit` keeps sh from exec'ing sleep in its place,
        // which would replace the command line we want to observe.
        let mut child = Command::new("sh")
            .args(["-c", "sleep 5; exit 0", "sh", JNDI_REENABLE_FLAG])
            .spawn()
            .expect("spawn sh");

        let mut detected = false;
        for _ in 0..50 {
            if has_jndi_reenable_flag(child.id()) {
                detected = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        child.kill().ok();
        child.wait().ok();
        assert!(detected);
    }
}
