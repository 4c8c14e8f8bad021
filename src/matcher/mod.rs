//! Matching test cases against compiler passes.
//!
//! Assertions are grouped and evaluated in order against the pass body,
//! moving a cursor forward as groups match:
//!
//! * `CHECK` searches from the cursor to the end of the body.
//! * `CHECK-NEXT` only looks at the line under the cursor.
//! * consecutive `CHECK-DAG`s match in any order, each on its own line.
//! * consecutive `CHECK-NOT`s are checked against the lines between the
//!   previous group's match and the next group's match.
//! * `CHECK-EVAL` evaluates an expression over the bound variables and does
//!   not move the cursor.

mod line;
mod variables;


pub use line::{match_line, CompiledAssertion};
pub use variables::Variables;

use tracing::{debug, trace};

use crate::annotation::{Assertion, AssertionKind, CheckerFile, Expression, TestCase};
use crate::config::FailurePolicy;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::dump::{DumpFile, Pass};
use crate::eval;
use crate::report::{Outcome, Report, TestResult};

/// Line range `[start, end)` of a pass body an assertion group may search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchScope {
    pub start: usize,
    pub end: usize,
}

impl MatchScope {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn lines(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Lines claimed by a successful group, and the bindings after it.
struct GroupMatch {
    first: usize,
    last: usize,
    variables: Variables,
}

/// An assertion that was not satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchFailure {
    pub assertion: Assertion,
    /// Body index where the search stopped, or the offending line for a
    /// `CHECK-NOT` that matched.
    pub position: usize,
    pub variables: Variables,
}

impl MatchFailure {
    fn new(assertion: &Assertion, position: usize, variables: &Variables) -> Self {
        Self {
            assertion: assertion.clone(),
            position,
            variables: variables.clone(),
        }
    }

    /// Describe the failure in terms of the dump-file lines of `pass`.
    pub fn to_diagnostic(&self, pass: &Pass) -> Diagnostic {
        let dump_line = pass.line_number(self.position);
        let message = if self.assertion.kind == AssertionKind::Not {
            format!("NOT assertion matched line {}", dump_line)
        } else {
            format!("Assertion could not be matched starting from line {}", dump_line)
        };
        let mut diagnostic = Diagnostic::error(ErrorKind::MatchFailed, message)
            .at_line(self.assertion.line)
            .with_note(format!(
                "assertion{}: {}",
                self.assertion.kind.suffix(),
                self.assertion.original_text
            ));
        if self.assertion.kind != AssertionKind::Eval {
            diagnostic = diagnostic.with_note(format!("as regex: {}", self.assertion.to_regex()));
        }
        if !self.variables.is_empty() {
            diagnostic = diagnostic.with_note(format!("bound variables: {}", self.variables));
        }
        diagnostic
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
    /// The assertions do not hold for this pass.
    Failed(MatchFailure),
    /// The assertions themselves are broken (unbound variable, bad `-EVAL`...).
    Fatal(Diagnostic),
}

impl From<Diagnostic> for MatchError {
    fn from(diagnostic: Diagnostic) -> Self {
        MatchError::Fatal(diagnostic)
    }
}

enum Group<'a> {
    InOrder(&'a Assertion),
    NextLine(&'a Assertion),
    Dag(Vec<&'a Assertion>),
    Not(Vec<&'a Assertion>),
    Eval(&'a Assertion),
    /// End of the pass body; closes a trailing `CHECK-NOT` run.
    End,
}

/// Merge runs of `CHECK-DAG` and of `CHECK-NOT`; everything else stands alone.
fn split_into_groups(assertions: &[Assertion]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for assertion in assertions {
        match (assertion.kind, groups.last_mut()) {
            (AssertionKind::Dag, Some(Group::Dag(run))) | (AssertionKind::Not, Some(Group::Not(run))) => {
                run.push(assertion);
            }
            (AssertionKind::Dag, _) => groups.push(Group::Dag(vec![assertion])),
            (AssertionKind::Not, _) => groups.push(Group::Not(vec![assertion])),
            (AssertionKind::InOrder, _) => groups.push(Group::InOrder(assertion)),
            (AssertionKind::NextLine, _) => groups.push(Group::NextLine(assertion)),
            (AssertionKind::Eval, _) => groups.push(Group::Eval(assertion)),
        }
    }
    groups.push(Group::End);
    groups
}

/// First line in `scope` matching `assertion`, skipping `excluded` lines.
fn find_matching_line(
    assertion: &CompiledAssertion<'_>,
    pass: &Pass,
    scope: MatchScope,
    variables: &Variables,
    excluded: &[usize],
) -> Result<Option<(usize, Variables)>, Diagnostic> {
    for index in scope.lines() {
        if excluded.contains(&index) {
            continue;
        }
        let Some(line) = pass.body.get(index) else {
            break;
        };
        if let Some(bound) = assertion.match_line(line, variables)? {
            return Ok(Some((index, bound)));
        }
    }
    Ok(None)
}

fn match_single(
    assertion: &Assertion,
    pass: &Pass,
    scope: MatchScope,
    variables: &Variables,
) -> Result<GroupMatch, MatchError> {
    let compiled = CompiledAssertion::new(assertion)?;
    match find_matching_line(&compiled, pass, scope, variables, &[])? {
        Some((index, variables)) => Ok(GroupMatch {
            first: index,
            last: index,
            variables,
        }),
        None => Err(MatchError::Failed(MatchFailure::new(assertion, scope.start, variables))),
    }
}

/// Each assertion claims its own line; bindings flow from one to the next.
fn match_dag_group(
    group: &[&Assertion],
    pass: &Pass,
    scope: MatchScope,
    variables: &Variables,
) -> Result<GroupMatch, MatchError> {
    let mut claimed: Vec<usize> = Vec::with_capacity(group.len());
    let mut variables = variables.clone();
    for assertion in group {
        let compiled = CompiledAssertion::new(assertion)?;
        match find_matching_line(&compiled, pass, scope, &variables, &claimed)? {
            Some((index, bound)) => {
                claimed.push(index);
                variables = bound;
            }
            None => {
                return Err(MatchError::Failed(MatchFailure::new(assertion, scope.start, &variables)));
            }
        }
    }
    Ok(GroupMatch {
        first: claimed.iter().copied().min().unwrap_or(scope.start),
        last: claimed.iter().copied().max().unwrap_or(scope.start),
        variables,
    })
}

fn check_not_group(
    group: &[&Assertion],
    pass: &Pass,
    scope: MatchScope,
    variables: &Variables,
) -> Result<(), MatchError> {
    let compiled = group
        .iter()
        .map(|assertion| CompiledAssertion::new(assertion))
        .collect::<Result<Vec<_>, _>>()?;
    // Report the earliest offending line.
    for index in scope.lines() {
        let Some(line) = pass.body.get(index) else {
            break;
        };
        for (assertion, matcher) in group.iter().zip(&compiled) {
            if matcher.match_line(line, variables)?.is_some() {
                return Err(MatchError::Failed(MatchFailure::new(assertion, index, variables)));
            }
        }
    }
    Ok(())
}

/// Substitute variable values into the expression and evaluate it.
fn check_eval(assertion: &Assertion, cursor: usize, variables: &Variables) -> Result<(), MatchError> {
    let mut text = String::new();
    for expression in &assertion.expressions {
        match expression {
            Expression::VarRef(name) => text.push_str(variables.lookup(name, assertion.line)?),
            other => text.push_str(other.text().unwrap_or_default()),
        }
    }

    let holds = eval::evaluate_condition(&text).map_err(|error| {
        Diagnostic::error(ErrorKind::Eval, format!("cannot evaluate '{}': {}", text, error))
            .at_line(assertion.line)
    })?;
    trace!(expression = %text, holds, "evaluated");
    if holds {
        Ok(())
    } else {
        Err(MatchError::Failed(MatchFailure::new(assertion, cursor, variables)))
    }
}

/// Check the assertions of `case` against `pass`. Returns the final bindings.
pub fn match_test_case(case: &TestCase, pass: &Pass) -> Result<Variables, MatchError> {
    if case.name != pass.name {
        return Err(MatchError::Fatal(
            Diagnostic::error(
                ErrorKind::PassNotFound,
                format!("test case '{}' paired with pass '{}'", case.name, pass.name),
            )
            .at_line(case.start_line),
        ));
    }

    let body_len = pass.body.len();
    let mut match_from = 0;
    let mut variables = Variables::new();
    let mut pending_not: Vec<&Assertion> = Vec::new();

    for group in split_into_groups(&case.assertions) {
        let found = match group {
            Group::Not(run) => {
                pending_not.extend(run);
                continue;
            }
            Group::Eval(assertion) => {
                check_eval(assertion, match_from, &variables)?;
                continue;
            }
            Group::InOrder(assertion) => {
                match_single(assertion, pass, MatchScope::new(match_from, body_len), &variables)?
            }
            Group::NextLine(assertion) => {
                match_single(assertion, pass, MatchScope::new(match_from, match_from + 1), &variables)?
            }
            Group::Dag(run) => {
                match_dag_group(&run, pass, MatchScope::new(match_from, body_len), &variables)?
            }
            Group::End => GroupMatch {
                first: body_len,
                last: body_len,
                variables: variables.clone(),
            },
        };

        if !pending_not.is_empty() {
            let scope = MatchScope::new(match_from, found.first);
            trace!(start = scope.start, end = scope.end, count = pending_not.len(), "checking NOT run");
            check_not_group(&pending_not, pass, scope, &variables)?;
            pending_not.clear();
        }

        match_from = found.last + 1;
        variables = found.variables;
    }

    Ok(variables)
}

/// Run every applicable test case of `checker` against `dump`.
///
/// Match failures become failed results; under [`FailurePolicy::FailFast`]
/// the run stops after the first one. Authoring errors and missing passes
/// abort the run with an error.
pub fn match_files(
    checker: &CheckerFile,
    dump: &DumpFile,
    target_arch: Option<&str>,
    debuggable: bool,
    policy: FailurePolicy,
) -> Result<Report, Diagnostic> {
    let mut report = Report::default();

    for case in &checker.test_cases {
        if !case.applies_to(target_arch, debuggable) {
            debug!(case = %case.name, arch = ?case.arch, debuggable = case.debuggable, "skipping test case");
            report.push(TestResult::new(&checker.name, case, Outcome::Skipped));
            continue;
        }

        let pass = dump.find_pass(&case.name).ok_or_else(|| {
            Diagnostic::error(ErrorKind::PassNotFound, "Test case not found in the CFG file")
                .at_line(case.start_line)
                .in_file(&checker.name)
                .with_note(format!("no pass named '{}' in {}", case.name, dump.name))
        })?;

        debug!(case = %case.name, pass_line = pass.start_line, "matching test case");
        match match_test_case(case, pass) {
            Ok(_) => report.push(TestResult::new(&checker.name, case, Outcome::Passed)),
            Err(MatchError::Failed(failure)) => {
                let diagnostic = failure.to_diagnostic(pass).in_file(&checker.name);
                debug!(case = %case.name, error = %diagnostic, "test case failed");
                report.push(TestResult::new(&checker.name, case, Outcome::Failed { diagnostic }));
                if policy == FailurePolicy::FailFast {
                    break;
                }
            }
            Err(MatchError::Fatal(diagnostic)) => return Err(diagnostic.in_file(&checker.name)),
        }
    }

    Ok(report)
}
