//! Driver-facing entry points.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::annotation::CheckerFile;
use crate::config::{CheckConfig, FailurePolicy};
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::dump::DumpFile;
use crate::matcher::match_files;
use crate::report::Report;

pub use crate::annotation::parse_annotations;
pub use crate::dump::parse_dump;

#[cfg(test)]
mod tests;

/// Run every applicable test case of `checker` against `dump`, stopping at
/// the first failure.
pub fn evaluate(
    checker: &CheckerFile,
    dump: &DumpFile,
    target_arch: Option<&str>,
    debuggable: bool,
) -> Result<Report, Diagnostic> {
    match_files(checker, dump, target_arch, debuggable, FailurePolicy::FailFast)
}

/// Names of all passes, in dump order.
pub fn list_passes(dump: &DumpFile) -> Vec<&str> {
    dump.pass_names().collect()
}

/// Body of the first pass named `name`, each line prefixed with its dump-file
/// line number.
pub fn dump_pass(dump: &DumpFile, name: &str) -> Result<String, Diagnostic> {
    dump.find_pass(name)
        .map(|pass| pass.numbered_body())
        .ok_or_else(|| {
            Diagnostic::error(ErrorKind::PassNotFound, format!("Pass not found: '{}'", name))
                .in_file(&dump.name)
                .with_help("use --list-passes to see the passes in this dump")
        })
}

/// Read a whole input file.
pub fn read_source(path: &Path) -> Result<String, Diagnostic> {
    std::fs::read_to_string(path).map_err(|e| {
        Diagnostic::error(ErrorKind::Io, format!("cannot read '{}': {}", path.display(), e))
    })
}

/// Read and parse a pass dump.
pub fn load_dump(path: &Path) -> Result<DumpFile, Diagnostic> {
    let source = read_source(path)?;
    parse_dump(&path.display().to_string(), &source)
}

/// Annotated sources under `path`. A file is returned as-is; a directory is
/// walked recursively for files with a configured extension, in sorted order.
pub fn find_checker_files(path: &Path, config: &CheckConfig) -> Result<Vec<PathBuf>, Diagnostic> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Diagnostic::error(
            ErrorKind::Io,
            format!("source path '{}' does not exist", path.display()),
        ));
    }
    let mut result = Vec::new();
    collect_source_files(path, config, &mut result)?;
    result.sort();
    Ok(result)
}

fn collect_source_files(dir: &Path, config: &CheckConfig, result: &mut Vec<PathBuf>) -> Result<(), Diagnostic> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        Diagnostic::error(ErrorKind::Io, format!("cannot read directory '{}': {}", dir.display(), e))
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();

        // Skip hidden directories
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            collect_source_files(&path, config, result)?;
        } else if config.is_source_file(&path) {
            result.push(path);
        }
    }
    Ok(())
}

/// Check every annotated source under `source_path` against the dump at
/// `dump_path`.
///
/// Under [`FailurePolicy::FailFast`] no further files are checked after the
/// first failing test case.
pub fn run_checks(dump_path: &Path, source_path: &Path, config: &CheckConfig) -> Result<Report, Diagnostic> {
    config.validate()?;
    let dump = load_dump(dump_path)?;
    let files = find_checker_files(source_path, config)?;
    debug!(passes = dump.passes.len(), files = files.len(), "loaded inputs");

    let mut report = Report::default();
    for file in &files {
        let name = file.display().to_string();
        let source = read_source(file)?;
        let checker = parse_annotations(&name, &config.prefix, &source, config.arch.as_deref())?;
        if checker.test_cases.is_empty() {
            continue;
        }
        let file_report = match_files(
            &checker,
            &dump,
            config.arch.as_deref(),
            config.debuggable,
            config.policy,
        )?;
        let failed = !file_report.is_success();
        report.merge(file_report);
        if failed && config.policy == FailurePolicy::FailFast {
            break;
        }
    }

    info!(
        passed = report.passed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "checks finished"
    );
    Ok(report)
}
