pub mod annotation;
pub mod api;
pub mod arch;
pub mod config;
pub mod diagnostic;
pub mod dump;
pub mod eval;
pub mod matcher;
pub mod report;
pub mod segment;

pub use annotation::{Assertion, AssertionKind, CheckerFile, Expression, TestCase};
pub use api::{
    dump_pass, evaluate, find_checker_files, list_passes, load_dump, parse_annotations, parse_dump,
    read_source, run_checks,
};
pub use config::{CheckConfig, FailurePolicy};
pub use diagnostic::{Diagnostic, ErrorKind};
pub use dump::{DumpFile, Pass};
pub use matcher::{match_files, match_test_case, MatchError, MatchFailure, Variables};
pub use report::{Outcome, Report, TestResult};
