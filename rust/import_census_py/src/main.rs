//! find-all-imports
//!
//! Find every module a Python program uses.
//!
//! ```text
//! find-all-imports [OPTIONS] <TARGET> [-- <ARGS>...]
//! ```
//!
//! Options anywhere on the line belong to find-all-imports; only what follows
//! `--` reaches the target as `sys.argv[1:]`.
//!
//! The target is imported and then executed in this process. Exercise every
//! feature that might import something (menus, commands, input paths), then
//! quit it normally: File>Quit for a GUI app, ^D for a command-line program.
//! Modules reached only through paths you did not exercise are not reported.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use import_census::report::render;
use import_census::{run_census, CensusConfig, CensusResult, ReportFormat, TargetProgram};
use import_census_py::logging::init_logging;
use import_census_py::PythonHost;
use pyo3::prelude::*;

#[derive(Parser)]
#[command(name = "find-all-imports")]
#[command(version)]
#[command(about = "List the modules a Python program imports statically and at run time", long_about = None)]
struct Cli {
    /// Python program to inspect
    target: PathBuf,

    /// Arguments passed to the program as sys.argv[1:]; must follow `--`
    #[arg(last = true)]
    args: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

impl Cli {
    fn config(&self) -> CensusConfig {
        let defaults = CensusConfig::default();
        let log_filter = match self.verbose {
            0 => defaults.log_filter.clone(),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        };
        CensusConfig {
            format: self.format.into(),
            log_filter,
            ..defaults
        }
    }
}

fn run(cli: Cli, config: &CensusConfig) -> CensusResult<String> {
    let target = TargetProgram::from_path(cli.target, cli.args)?;
    Python::with_gil(|py| {
        let mut host = PythonHost::new(py, config);
        let report = run_census(&mut host, &target)?;
        render(&report, config.format)
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();
    init_logging(&config.log_filter);

    match run(cli, &config) {
        Ok(rendered) => {
            print!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), "Census failed");
            if let Some(traceback) = err.traceback() {
                eprint!("{traceback}");
            }
            eprintln!("find-all-imports: {err}");
            ExitCode::FAILURE
        }
    }
}
