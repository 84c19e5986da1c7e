use crate::config::ScanConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "jndiscan")]
#[command(about = "Scan a host for the log4j JNDI lookup exposure in jar archives")]
#[command(version)]
pub struct Args {
    /// Remove the vulnerable class from standalone suspect archives
    /// (a verified backup is kept beside each original)
    #[arg(short, long)]
    pub fix: bool,

    /// Inspect only this archive, skipping discovery and the package
    /// query (repeatable)
    #[arg(short = 'j', long = "jar", value_name = "PATH")]
    pub jars: Vec<PathBuf>,

    /// Restrict filesystem discovery to this root (repeatable)
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Skip a scan source (repeatable)
    #[arg(short = 's', long = "skip", value_name = "SOURCE")]
    pub skip: Vec<SkipSource>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkipSource {
    /// Filesystem discovery
    Files,
    /// Installed-package query
    Packages,
    /// Process-table discovery
    Processes,
}

impl Args {
    /// Translate parsed arguments into a scan configuration.
    pub fn to_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            fix: self.fix,
            explicit_archives: self.jars.clone(),
            roots: if self.paths.is_empty() { defaults.roots } else { self.paths.clone() },
            scan_files: !self.skip.contains(&SkipSource::Files),
            scan_packages: !self.skip.contains(&SkipSource::Packages),
            scan_processes: !self.skip.contains(&SkipSource::Processes),
        }
    }
}
