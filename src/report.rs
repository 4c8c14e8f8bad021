//! Outcome of a checker run.

use std::fmt;

use serde::Serialize;

use crate::annotation::TestCase;
use crate::diagnostic::Diagnostic;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Passed,
    Failed { diagnostic: Diagnostic },
    /// Not applicable to the target architecture or debuggable mode.
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestResult {
    /// Checker file the test case was declared in.
    pub file: String,
    pub name: String,
    pub arch: Option<String>,
    pub debuggable: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TestResult {
    pub fn new(file: &str, case: &TestCase, outcome: Outcome) -> Self {
        Self {
            file: file.to_string(),
            name: case.name.clone(),
            arch: case.arch.clone(),
            debuggable: case.debuggable,
            outcome,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub results: Vec<TestResult>,
}

impl Report {
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn merge(&mut self, other: Report) {
        self.results.extend(other.results);
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Outcome::Failed { diagnostic } => Some(diagnostic),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// One `TEST <name>... PASS|FAIL` line per test case that ran.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let status = match result.outcome {
                Outcome::Passed => "PASS",
                Outcome::Failed { .. } => "FAIL",
                Outcome::Skipped => continue,
            };
            writeln!(f, "TEST {}... {}", result.name, status)?;
        }
        Ok(())
    }
}
