//! Checker annotations embedded in test sources.
//!
//! A test case opens with `/// CHECK-START: <pass>` and collects the
//! assertions that follow it until the next `CHECK-START` line.

mod parser;


pub use parser::{parse_annotations, parse_assertion, DEFAULT_PREFIX};

use crate::arch;
use crate::diagnostic::{Diagnostic, ErrorKind};

/// One piece of an assertion line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// Literal text. Only produced for `-EVAL` lines.
    PlainText(String),
    /// A regex. Plain text outside `-EVAL` lines is stored here, escaped.
    Pattern(String),
    /// `<<NAME>>`
    VarRef(String),
    /// `<<NAME:regex>>`
    VarDef { name: String, pattern: String },
    /// Whitespace between words.
    Separator,
}

impl Expression {
    /// Plain text that must match literally.
    pub fn literal(text: &str) -> Self {
        Expression::Pattern(regex::escape(text))
    }

    /// Literal or regex payload; `None` for separators and references.
    pub fn text(&self) -> Option<&str> {
        match self {
            Expression::PlainText(text) | Expression::Pattern(text) => Some(text),
            Expression::VarDef { pattern, .. } => Some(pattern),
            Expression::VarRef(_) | Expression::Separator => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssertionKind {
    /// `CHECK:` matches some later line.
    InOrder,
    /// `CHECK-NEXT:` matches the line right after the previous match.
    NextLine,
    /// `CHECK-DAG:` matches in any order among consecutive DAG assertions.
    Dag,
    /// `CHECK-NOT:` must not match between its neighbours.
    Not,
    /// `CHECK-EVAL:` evaluates an expression over bound variables.
    Eval,
}

impl AssertionKind {
    /// Keyword suffix following the prefix, e.g. `-DAG`.
    pub fn suffix(self) -> &'static str {
        match self {
            AssertionKind::InOrder => "",
            AssertionKind::NextLine => "-NEXT",
            AssertionKind::Dag => "-DAG",
            AssertionKind::Not => "-NOT",
            AssertionKind::Eval => "-EVAL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    pub kind: AssertionKind,
    pub expressions: Vec<Expression>,
    /// 1-based line in the checker file.
    pub line: usize,
    pub original_text: String,
}

impl Assertion {
    pub fn new(kind: AssertionKind, original_text: &str, line: usize) -> Self {
        Self {
            kind,
            expressions: Vec::new(),
            line,
            original_text: original_text.to_string(),
        }
    }

    pub fn push_expression(&mut self, expression: Expression) -> Result<(), Diagnostic> {
        if self.kind == AssertionKind::Not && matches!(expression, Expression::VarDef { .. }) {
            return Err(Diagnostic::error(
                ErrorKind::Ordering,
                "CHECK-NOT lines cannot define variables",
            )
            .at_line(self.line));
        }
        self.expressions.push(expression);
        Ok(())
    }

    /// Regex form of the assertion: each expression in parentheses, words
    /// separated by `, `.
    pub fn to_regex(&self) -> String {
        let mut regex = String::new();
        for expression in &self.expressions {
            match expression {
                Expression::Separator => regex.push_str(", "),
                Expression::VarRef(name) => {
                    regex.push_str("(<<");
                    regex.push_str(name);
                    regex.push_str(">>)");
                }
                other => {
                    regex.push('(');
                    regex.push_str(other.text().unwrap_or_default());
                    regex.push(')');
                }
            }
        }
        regex
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    /// Pass this case runs against, `"<method> <pass>"`.
    pub name: String,
    /// `None` runs on every architecture.
    pub arch: Option<String>,
    pub debuggable: bool,
    pub assertions: Vec<Assertion>,
    pub start_line: usize,
}

impl TestCase {
    pub fn new(
        name: &str,
        start_line: usize,
        arch: Option<String>,
        debuggable: bool,
    ) -> Result<Self, Diagnostic> {
        if name.is_empty() {
            return Err(Diagnostic::parse("Test case does not have a name").at_line(start_line));
        }
        Ok(Self {
            name: name.to_string(),
            arch,
            debuggable,
            assertions: Vec::new(),
            start_line,
        })
    }

    pub fn add_assertion(&mut self, assertion: Assertion) -> Result<(), Diagnostic> {
        if assertion.kind == AssertionKind::NextLine {
            let follows_in_order = matches!(
                self.assertions.last().map(|a| a.kind),
                Some(AssertionKind::InOrder | AssertionKind::NextLine)
            );
            if !follows_in_order {
                return Err(Diagnostic::error(
                    ErrorKind::Ordering,
                    "A next-line assertion can only be placed after an in-order assertion or another next-line assertion.",
                )
                .at_line(assertion.line));
            }
        }
        self.assertions.push(assertion);
        Ok(())
    }

    /// Whether this case should run for the given target.
    pub fn applies_to(&self, target_arch: Option<&str>, debuggable: bool) -> bool {
        let arch_ok = match (&self.arch, target_arch) {
            (None, _) => true,
            (Some(own), Some(target)) => arch::same(own, target),
            (Some(_), None) => false,
        };
        arch_ok && self.debuggable == debuggable
    }
}

/// All test cases of one annotated source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckerFile {
    pub name: String,
    pub test_cases: Vec<TestCase>,
}

impl CheckerFile {
    /// Test cases restricted to exactly this architecture.
    pub fn test_cases_for_arch(&self, target_arch: &str) -> Vec<&TestCase> {
        self.test_cases
            .iter()
            .filter(|case| case.arch.as_deref().is_some_and(|own| arch::same(own, target_arch)))
            .collect()
    }
}
