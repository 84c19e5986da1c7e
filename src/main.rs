use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use jndiscan::cli::Args;
use jndiscan::{output, ScanReport, Scanner};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    // Help and version requests succeed; any other parse problem is a
    // usage error and shares the findings exit code.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            return code;
        }
    };

    init_logging(args.verbose);
    debug!("Logging initialized (verbose={})", args.verbose);

    // Banner to stderr; status info never goes to stdout.
    eprintln!("jndiscan v{}", env!("CARGO_PKG_VERSION"));

    let report = match execute(&args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return 1;
        }
    };

    print!("{}", output::render(&report));

    if report.has_findings() {
        1
    } else {
        0
    }
}

fn execute(args: &Args) -> Result<ScanReport> {
    let scanner = Scanner::new(args.to_config()).context("invalid scan configuration")?;
    scanner.run().context("scan aborted")
}

/// Use RUST_LOG when set, otherwise derive the filter from -v.
fn init_logging(verbose: u8) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("jndiscan=info"),
            1 => EnvFilter::new("jndiscan=debug"),
            _ => EnvFilter::new("jndiscan=trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
