use regex::{Captures, Regex};
use tracing::debug;

use super::{Assertion, AssertionKind, CheckerFile, Expression, TestCase};
use crate::arch;
use crate::diagnostic::Diagnostic;
use crate::segment::{split_stream, Classified};

pub const DEFAULT_PREFIX: &str = "CHECK";

const COMMENT_MARKERS: [&str; 2] = ["///", "##"];
const START_SUFFIX: &str = "-START";
const DEBUGGABLE_SUFFIX: &str = "-DEBUGGABLE";

/// Kinds tried, in order, after the plain `CHECK:` form.
const SUFFIXED_KINDS: [AssertionKind; 4] = [
    AssertionKind::NextLine,
    AssertionKind::Dag,
    AssertionKind::Not,
    AssertionKind::Eval,
];

type AssertionLine = (String, AssertionKind, usize);
type CaseMetadata = (Option<String>, bool);

/// Splits the text after `CHECK...:` into expressions.
struct Tokenizer {
    whitespace: Regex,
    pattern: Regex,
    var_ref: Regex,
    var_def: Regex,
}

impl Tokenizer {
    fn new() -> Result<Self, Diagnostic> {
        let build = |source: &str| {
            Regex::new(source).map_err(|error| {
                Diagnostic::parse(format!("failed to compile tokenizer regex: {}", error))
            })
        };
        Ok(Self {
            whitespace: build(r"\s+")?,
            pattern: build(r"\{\{(.+?)\}\}")?,
            var_ref: build(r"<<([a-zA-Z][a-zA-Z0-9]*)>>")?,
            var_def: build(r"<<([a-zA-Z][a-zA-Z0-9]*):(.+?)>>")?,
        })
    }

    fn tokenize(&self, text: &str, kind: AssertionKind, line: usize) -> Result<Assertion, Diagnostic> {
        let mut assertion = Assertion::new(kind, text, line);
        let is_eval = kind == AssertionKind::Eval;
        let mut rest = text;

        while !rest.is_empty() {
            // `-EVAL` lines only know variable references and plain text.
            let (whitespace, pattern, var_def) = if is_eval {
                (None, None, None)
            } else {
                (
                    self.whitespace.find(rest).map(|m| m.range()),
                    self.pattern.captures(rest),
                    self.var_def.captures(rest),
                )
            };
            let var_ref = self.var_ref.captures(rest);

            if let Some(range) = whitespace.clone().filter(|r| r.start == 0) {
                assertion.push_expression(Expression::Separator)?;
                rest = &rest[range.end..];
            } else if let Some(caps) = at_start(&pattern) {
                let body = &caps[1];
                validate_regex(body, line)?;
                assertion.push_expression(Expression::Pattern(body.to_string()))?;
                rest = &rest[caps[0].len()..];
            } else if let Some(caps) = at_start(&var_ref) {
                assertion.push_expression(Expression::VarRef(caps[1].to_string()))?;
                rest = &rest[caps[0].len()..];
            } else if let Some(caps) = at_start(&var_def) {
                let body = &caps[2];
                validate_regex(body, line)?;
                assertion.push_expression(Expression::VarDef {
                    name: caps[1].to_string(),
                    pattern: body.to_string(),
                })?;
                rest = &rest[caps[0].len()..];
            } else {
                // Plain text runs up to the nearest special token.
                let end = [
                    whitespace.map(|r| r.start),
                    start_of(&pattern),
                    start_of(&var_ref),
                    start_of(&var_def),
                ]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
                let plain = &rest[..end];
                let expression = if is_eval {
                    Expression::PlainText(plain.to_string())
                } else {
                    Expression::literal(plain)
                };
                assertion.push_expression(expression)?;
                rest = &rest[end..];
            }
        }

        Ok(assertion)
    }
}

fn at_start<'a, 'h>(caps: &'a Option<Captures<'h>>) -> Option<&'a Captures<'h>> {
    caps.as_ref().filter(|c| c.get(0).is_some_and(|m| m.start() == 0))
}

fn start_of(caps: &Option<Captures<'_>>) -> Option<usize> {
    caps.as_ref().and_then(|c| c.get(0)).map(|m| m.start())
}

fn validate_regex(pattern: &str, line: usize) -> Result<(), Diagnostic> {
    Regex::new(pattern).map(|_| ()).map_err(|error| {
        Diagnostic::parse(format!("Invalid pattern '{}'", pattern))
            .at_line(line)
            .with_note(error.to_string())
    })
}

/// Parse the text of a single assertion line (everything after the colon).
pub fn parse_assertion(text: &str, kind: AssertionKind, line: usize) -> Result<Assertion, Diagnostic> {
    Tokenizer::new()?.tokenize(text, kind, line)
}

/// Text after the leading comment marker, or `None` for ordinary lines.
fn strip_comment_marker(line: &str) -> Option<&str> {
    COMMENT_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim_start)
}

/// Rewrite `-{arm,arm64}` into the single architecture this run targets, or
/// the first listed one so the case is still created (and later skipped).
/// Sets naming an unknown architecture are left alone.
fn select_arch_from_set(head: &str, target_arch: Option<&str>) -> Option<String> {
    let open = head.find('{')?;
    let close = head.find('}')?;
    if open == 0 || close < open {
        return None;
    }
    let archs: Vec<&str> = head[open + 1..close].split(',').map(str::trim).collect();
    if !archs.iter().all(|a| arch::is_known(a)) {
        return None;
    }
    let chosen = target_arch
        .and_then(|target| archs.iter().find(|a| arch::same(a, target)))
        .or_else(|| archs.first())?;
    Some(format!("{}{}{}", &head[..open], chosen, &head[close + 1..]))
}

/// Decode the part between `CHECK-START` and the colon: an optional
/// architecture followed by an optional `-DEBUGGABLE`.
fn parse_start_suffix(head: &str) -> Option<CaseMetadata> {
    let (head, debuggable) = match head.strip_suffix(DEBUGGABLE_SUFFIX) {
        Some(rest) => (rest, true),
        None => (head, false),
    };
    if head.is_empty() {
        return Some((None, debuggable));
    }
    let arch = head.strip_prefix('-').filter(|a| arch::is_known(a))?;
    Some((Some(arch.to_string()), debuggable))
}

struct LineClassifier<'a> {
    prefix: &'a str,
    target_arch: Option<&'a str>,
}

impl LineClassifier<'_> {
    fn classify(&self, line: &str, line_no: usize) -> Result<Classified<AssertionLine, CaseMetadata>, Diagnostic> {
        let Some(after_marker) = strip_comment_marker(line) else {
            return Ok(Classified::skip());
        };
        let unparsable = || {
            Diagnostic::parse(format!("Checker assertion could not be parsed: '{}'", line))
                .at_line(line_no)
        };
        let keyword = after_marker.strip_prefix(self.prefix).ok_or_else(unparsable)?;

        if let Some(rest) = keyword.strip_prefix(START_SUFFIX) {
            if let Some(colon) = rest.find(':') {
                let head = &rest[..colon];
                let head = select_arch_from_set(head, self.target_arch).unwrap_or_else(|| head.to_string());
                if let Some(metadata) = parse_start_suffix(&head) {
                    let name = rest[colon + 1..].trim();
                    return Ok(Classified::start(name, Some(metadata)));
                }
            }
        }

        if let Some(text) = keyword.strip_prefix(':') {
            return Ok(Classified::content((text.trim().to_string(), AssertionKind::InOrder, line_no)));
        }
        for kind in SUFFIXED_KINDS {
            if let Some(text) = keyword
                .strip_prefix(kind.suffix())
                .and_then(|rest| rest.strip_prefix(':'))
            {
                return Ok(Classified::content((text.trim().to_string(), kind, line_no)));
            }
        }

        Err(unparsable())
    }
}

/// Parse the checker annotations of one source file.
///
/// `prefix` is the keyword after the comment marker (normally `CHECK`).
/// `target_arch` selects the member of `CHECK-START-{a,b}` sets.
pub fn parse_annotations(
    name: &str,
    prefix: &str,
    source: &str,
    target_arch: Option<&str>,
) -> Result<CheckerFile, Diagnostic> {
    if prefix.is_empty() {
        return Err(Diagnostic::parse("check prefix must not be empty").in_file(name));
    }
    let classifier = LineClassifier { prefix, target_arch };
    let chunks = split_stream(
        source.lines(),
        |line, line_no| classifier.classify(line, line_no),
        |_, line_no| Diagnostic::parse("Checker line not inside a group").at_line(line_no),
    )
    .map_err(|d| d.in_file(name))?;

    let tokenizer = Tokenizer::new()?;
    let mut test_cases = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let (arch, debuggable) = chunk.metadata.unwrap_or_default();
        let mut case = TestCase::new(&chunk.name, chunk.start_line, arch, debuggable)
            .map_err(|d| d.in_file(name))?;
        for (text, kind, line) in chunk.lines {
            let assertion = tokenizer
                .tokenize(&text, kind, line)
                .map_err(|d| d.in_file(name))?;
            case.add_assertion(assertion).map_err(|d| d.in_file(name))?;
        }
        debug!(
            case = %case.name,
            arch = ?case.arch,
            debuggable = case.debuggable,
            assertions = case.assertions.len(),
            "parsed test case"
        );
        test_cases.push(case);
    }

    Ok(CheckerFile {
        name: name.to_string(),
        test_cases,
    })
}
