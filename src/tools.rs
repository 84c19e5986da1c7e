//! Host capability probing for the external utilities the scan sources use.

use std::process::Command;
use tracing::debug;

/// Which optional host utilities are present, probed once at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCapabilities {
    pub lsof: bool,
    pub ps: bool,
    pub rpm: bool,
}

impl HostCapabilities {
    /// Probe the host for the tools the scan sources rely on.
    pub fn probe() -> Self {
        let caps = Self {
            lsof: tool_available("lsof", "-v"),
            ps: tool_available("ps", "--version"),
            rpm: tool_available("rpm", "--version"),
        };
        debug!("Host capabilities: lsof={}, ps={}, rpm={}", caps.lsof, caps.ps, caps.rpm);
        caps
    }
}

/// Check whether `tool` is on PATH by running it with a cheap probe argument.
fn tool_available(tool: &str, probe_arg: &str) -> bool {
    Command::new(tool)
        .arg(probe_arg)
        .output()
        .is_ok_and(|output| output.status.success())
}
