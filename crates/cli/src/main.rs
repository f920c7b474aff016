//! Memory-model co-simulation runner.
//!
//! This binary hosts the traffic-generator target on the software substrate and drives it
//! to completion. It performs:
//! 1. **Platform load:** A JSON platform description, or the built-in single-model default.
//! 2. **Driver build:** Memory models, assertion, print, and test-harness endpoints.
//! 3. **Run:** Polling loop to completion, with the verdict and speed report on stderr.
//!
//! Everything after the options is passed through as plusargs, for example
//! `fasedsim --config platform.json +max-cycles=100000 +profile-interval=1000`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use fasedsim_driver::config::PlatformConfig;
use fasedsim_driver::sim::build_driver;
use fasedsim_driver::simif::TrafficGenerator;
use fasedsim_driver::{DriverError, RunReport, SoftwareSimif};

#[derive(Parser, Debug)]
#[command(
    name = "fasedsim",
    author,
    version,
    about = "Cycle-accurate memory-model co-simulation driver",
    long_about = "Run the memory-model traffic test on the software substrate.\n\nArguments after the options are plusargs:\n  +max-cycles=N          cycle budget (-1 for unbounded)\n  +profile-interval=N    memory-model sampling period (-1 disables)\n  +zero-out-dram         clear target DRAM before reset\n  +mm_<register>=V       memory-model register setting\n  +print-file=PATH       capture target prints to PATH\n  +print-start=N         first cycle to capture prints\n  +print-end=N           last cycle to capture prints\n\nExamples:\n  fasedsim +max-cycles=100000\n  fasedsim --config platform.json +mm_readMaxReqs=4 +profile-interval=500"
)]
struct Cli {
    /// Platform description (JSON). Uses the built-in default platform when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plusargs for the driver and its components.
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    plusargs: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => process::exit(report.exit_code),
        Err(e @ DriverError::AssertionFailed { .. }) => {
            eprintln!("[!] FATAL: {e}");
            process::exit(e.exit_status());
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("Error: {e}");
            process::exit(e.exit_status());
        }
    }
}

/// Loads the platform, builds the driver on a software substrate, and runs it.
fn run(cli: &Cli) -> Result<RunReport, DriverError> {
    let platform = match &cli.config {
        Some(path) => PlatformConfig::from_file(path)?,
        None => PlatformConfig::default(),
    };
    debug!(?platform, "platform loaded");

    let design = TrafficGenerator::new(&platform);
    let simif = SoftwareSimif::new(&platform.host, Box::new(design));
    let mut driver = build_driver(&cli.plusargs, &platform, simif)?;
    driver.run()
}
