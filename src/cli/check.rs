use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use irchecker::config::Overrides;
use irchecker::{CheckConfig, Outcome, Report};

use super::passes::{cmd_dump_pass, cmd_list_passes};
use super::{fail, report_diagnostic};

#[derive(Args)]
pub struct CheckArgs {
    /// Compiler output dump (c1visualizer format)
    pub tested_file: PathBuf,
    /// Annotated source file, or directory searched recursively
    pub source_path: Option<PathBuf>,
    /// Keyword after the comment marker (default: CHECK)
    #[arg(long)]
    pub check_prefix: Option<String>,
    /// Print the names of all passes in the dump
    #[arg(long)]
    pub list_passes: bool,
    /// Print the body of one pass with line numbers
    #[arg(long, value_name = "PASS")]
    pub dump_pass: Option<String>,
    /// Target architecture (ARM, ARM64, MIPS, MIPS64, X86, X86_64)
    #[arg(long)]
    pub arch: Option<String>,
    /// Run the test cases meant for debuggable compilation
    #[arg(long)]
    pub debuggable: bool,
    /// Keep checking after the first failing test case
    #[arg(long)]
    pub keep_going: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Only print failures
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn cmd_check(args: CheckArgs) {
    if args.list_passes {
        cmd_list_passes(&args.tested_file);
        return;
    }
    if let Some(pass) = &args.dump_pass {
        cmd_dump_pass(&args.tested_file, pass);
        return;
    }

    let Some(source_path) = args.source_path.clone() else {
        eprintln!("error: SOURCE_PATH is required unless --list-passes or --dump-pass is given");
        process::exit(1);
    };

    let config = resolve_config(&args, &source_path);
    let report = match irchecker::run_checks(&args.tested_file, &source_path, &config) {
        Ok(report) => report,
        Err(e) => fail(e),
    };

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot serialize report: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_report(&report, args.quiet);
    }

    if !report.is_success() {
        process::exit(1);
    }
}

fn resolve_config(args: &CheckArgs, source_path: &Path) -> CheckConfig {
    let start_dir = if source_path.is_dir() {
        source_path
    } else {
        source_path.parent().unwrap_or(Path::new("."))
    };
    let overrides = Overrides {
        prefix: args.check_prefix.clone(),
        arch: args.arch.clone(),
        debuggable: args.debuggable,
        keep_going: args.keep_going,
    };
    match CheckConfig::resolve(start_dir, overrides) {
        Ok(config) => config,
        Err(e) => fail(e),
    }
}

fn print_report(report: &Report, quiet: bool) {
    for result in &report.results {
        match &result.outcome {
            Outcome::Passed => {
                if !quiet {
                    println!("TEST {}... PASS", result.name);
                }
            }
            Outcome::Failed { diagnostic } => {
                if !quiet {
                    println!("TEST {}... FAIL", result.name);
                }
                report_diagnostic(diagnostic);
            }
            Outcome::Skipped => {}
        }
    }
}
