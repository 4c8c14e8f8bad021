pub mod check;
pub mod passes;

use std::path::Path;
use std::process;

use irchecker::Diagnostic;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `IRCHECKER_LOG=debug`.
const LOG_ENV: &str = "IRCHECKER_LOG";

/// Install the stderr log subscriber. Defaults to warnings only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Render a diagnostic against the file it points at, when that file can be
/// read.
pub fn report_diagnostic(diag: &Diagnostic) {
    let source = diag
        .location
        .file
        .as_deref()
        .and_then(|file| std::fs::read_to_string(Path::new(file)).ok());
    diag.render(source.as_deref(), use_color());
}

/// Report a fatal error and exit.
pub fn fail(diag: Diagnostic) -> ! {
    report_diagnostic(&diag);
    process::exit(1);
}

/// Load the dump or exit.
pub fn load_dump_or_exit(path: &Path) -> irchecker::DumpFile {
    match irchecker::load_dump(path) {
        Ok(dump) => dump,
        Err(e) => fail(e),
    }
}
