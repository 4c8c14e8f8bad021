use std::fmt;
use std::io;
use std::ops::Range;

use serde::Serialize;

/// What went wrong. Every fatal condition the checker can hit maps to one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Malformed dump or annotation syntax.
    Parse,
    /// Assertions declared in an order the engine cannot honor.
    Ordering,
    /// An assertion could not be satisfied against its pass.
    MatchFailed,
    /// A `<<NAME>>` reference to a variable nobody defined.
    UnboundVariable,
    /// A `<<NAME:regex>>` definition of a name that is already bound.
    VariableRedefinition,
    /// A test case names a pass the dump does not contain.
    PassNotFound,
    /// A `-EVAL` expression that cannot be evaluated.
    Eval,
    /// Reading an input failed.
    Io,
    /// Invalid checker configuration.
    Config,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Ordering => "ordering violation",
            ErrorKind::MatchFailed => "match failure",
            ErrorKind::UnboundVariable => "unbound variable",
            ErrorKind::VariableRedefinition => "variable redefinition",
            ErrorKind::PassNotFound => "pass not found",
            ErrorKind::Eval => "eval error",
            ErrorKind::Io => "io error",
            ErrorKind::Config => "configuration error",
        }
    }
}

/// File and 1-based line a diagnostic points at. Either may be unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: Option<String>,
    pub line: Option<usize>,
}

/// A checker diagnostic: a fatal parse/authoring error or a failed assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Location,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::default(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::error(ErrorKind::Parse, message)
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.location.line = Some(line);
        self
    }

    /// Attach a file name unless one is already set. Errors raised deep in the
    /// engine only know their line; the caller that owns the file fills it in.
    pub fn in_file(mut self, file: &str) -> Self {
        if self.location.file.is_none() {
            self.location.file = Some(file.to_string());
        }
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic with ariadne against the text of the file it
    /// points at.
    pub fn render_to<W: io::Write>(&self, source: &str, colored: bool, out: W) -> io::Result<()> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let filename = self.location.file.as_deref().unwrap_or("<input>");
        let span = self
            .location
            .line
            .map(|line| line_span(source, line))
            .unwrap_or(0..0);

        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(colored))
            .with_message(format!("{}: {}", self.kind.label(), self.message))
            .with_label(
                Label::new((filename, span))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish().write((filename, Source::from(source)), out)
    }

    /// Render to stderr. Falls back to the one-line form when the source text
    /// is not available.
    pub fn render(&self, source: Option<&str>, colored: bool) {
        let rendered = match source {
            Some(source) => self.render_to(source, colored, io::stderr()).is_ok(),
            None => false,
        };
        if !rendered {
            eprintln!("{}", self);
            for note in &self.notes {
                eprintln!("  note: {}", note);
            }
            if let Some(help) = &self.help {
                eprintln!("  help: {}", help);
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.location.file, self.location.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}: ", file, line)?,
            (Some(file), None) => write!(f, "{}: ", file)?,
            (None, Some(line)) => write!(f, "line {}: ", line)?,
            (None, None) => {}
        }
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Character range of a 1-based line, without its terminator. ariadne 0.4
/// addresses sources by character offset.
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        let len = text.chars().count();
        if index + 1 == line {
            let body = text.trim_end_matches(['\n', '\r']).chars().count();
            return offset..offset + body;
        }
        offset += len;
    }
    offset..offset
}
