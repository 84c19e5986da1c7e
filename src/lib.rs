//! jndiscan - host scanner for the log4j JNDI lookup exposure.
//!
//! The scan walks archives (including archives nested inside archives),
//! running processes and installed packages, classifies what it finds
//! against the versions that ship with the lookup disabled, and can strip
//! the vulnerable class from standalone archives.
//!
//! # Example
//!
//! ```no_run
//! use jndiscan::{ScanConfig, Scanner};
//!
//! let config = ScanConfig {
//!     explicit_archives: vec!["app.jar".into()],
//!     ..ScanConfig::default()
//! };
//! let report = Scanner::new(config).unwrap().run().unwrap();
//!
//! for suspect in report.suspects() {
//!     println!("{}", suspect.identity);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod output;
pub mod packages;
pub mod procs;
pub mod remediate;
pub mod report;
pub mod scanner;
pub mod tools;
pub mod version;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use report::{
    ArchiveIdentity, Candidate, Classification, PackageFinding, RemediationResult, ScanReport,
};
pub use scanner::Scanner;

/// Run a full scan with the given configuration.
pub fn scan_with_config(config: ScanConfig) -> Result<ScanReport> {
    Scanner::new(config)?.run()
}
