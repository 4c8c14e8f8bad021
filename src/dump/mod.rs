//! Compiler pass dumps.
//!
//! A dump is a sequence of compilation headers and per-pass blocks:
//!
//! ```text
//! begin_compilation
//!   method "Main.foo"
//! end_compilation
//! begin_cfg
//!   name "constant_folding (after)"
//!   <body>
//! end_cfg
//! ```
//!
//! Every `begin_cfg` block becomes a [`Pass`] named after the most recent
//! method and the block's pass name.

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::segment::{split_stream, Classified};

/// One named stage of the compiler output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pass {
    /// `"<method> <pass>"`.
    pub name: String,
    pub body: Vec<String>,
    /// 1-based line of the `name "..."` header.
    pub start_line: usize,
    body_lines: Vec<usize>,
}

impl Pass {
    pub fn new(name: String, body: Vec<(usize, String)>, start_line: usize) -> Result<Self, Diagnostic> {
        if body.is_empty() {
            return Err(Diagnostic::parse(format!("A pass must not be empty: '{}'", name))
                .at_line(start_line));
        }
        let (body_lines, body): (Vec<usize>, Vec<String>) = body.into_iter().unzip();
        Ok(Self {
            name,
            body,
            start_line,
            body_lines,
        })
    }

    /// Dump-file line number of body line `index`. One past the end maps to
    /// the line after the last body line.
    pub fn line_number(&self, index: usize) -> usize {
        match self.body_lines.get(index) {
            Some(&line) => line,
            None => self.body_lines.last().map_or(self.start_line, |&l| l) + 1,
        }
    }

    /// The body with each line prefixed by its dump line number, padded so the
    /// text columns line up.
    pub fn numbered_body(&self) -> String {
        let width = self.line_number(self.body.len()).to_string().len() + 2;
        let mut out = String::new();
        for (index, line) in self.body.iter().enumerate() {
            let label = format!("{}:", self.line_number(index));
            out.push_str(&format!("{:<width$}{}\n", label, line, width = width));
        }
        out
    }
}

/// All passes of one dump, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DumpFile {
    pub name: String,
    pub passes: Vec<Pass>,
}

impl DumpFile {
    /// First pass with the given name. A pass that runs more than once in the
    /// same method appears several times; only the first occurrence is found.
    pub fn find_pass(&self, name: &str) -> Option<&Pass> {
        self.passes.iter().find(|pass| pass.name == name)
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|pass| pass.name.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    OutsideBlock,
    InsideCompilationBlock,
    StartingCfgBlock,
    InsideCfgBlock,
}

struct DumpParser {
    state: State,
    method: Option<String>,
}

impl DumpParser {
    fn classify(&mut self, line: &str, line_no: usize) -> Result<Classified<(usize, String), ()>, Diagnostic> {
        match self.state {
            State::StartingCfgBlock => match quoted_argument(line, "name") {
                Some(pass) if !pass.is_empty() => {
                    self.state = State::InsideCfgBlock;
                    let method = self.method.as_deref().unwrap_or_default();
                    Ok(Classified::start(format!("{} {}", method, pass), None))
                }
                _ => Err(Diagnostic::parse("Expected output group name").at_line(line_no)),
            },
            State::InsideCfgBlock => {
                if line == "end_cfg" {
                    self.state = State::OutsideBlock;
                    Ok(Classified::skip())
                } else {
                    Ok(Classified::content((line_no, line.to_string())))
                }
            }
            State::InsideCompilationBlock => {
                if let Some(method) = quoted_argument(line, "method") {
                    let method = method.trim();
                    if method.is_empty() {
                        return Err(Diagnostic::parse("Empty method name in output").at_line(line_no));
                    }
                    self.method = Some(method.to_string());
                } else if line == "end_compilation" {
                    self.state = State::OutsideBlock;
                }
                Ok(Classified::skip())
            }
            State::OutsideBlock => match line {
                "begin_cfg" => {
                    if self.method.is_none() {
                        return Err(Diagnostic::parse("Expected method header").at_line(line_no));
                    }
                    self.state = State::StartingCfgBlock;
                    Ok(Classified::skip())
                }
                "begin_compilation" => {
                    self.state = State::InsideCompilationBlock;
                    Ok(Classified::skip())
                }
                _ => Err(Diagnostic::parse(format!("Dump line not inside a group: '{}'", line))
                    .at_line(line_no)),
            },
        }
    }
}

/// `keyword "value" ...` yields `value`; anything after the closing quote is
/// ignored.
fn quoted_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    let value = trimmed.strip_prefix('"')?;
    let end = value.find('"')?;
    Some(&value[..end])
}

/// Parse a pass dump. `name` labels diagnostics.
pub fn parse_dump(name: &str, source: &str) -> Result<DumpFile, Diagnostic> {
    let mut parser = DumpParser {
        state: State::OutsideBlock,
        method: None,
    };

    let chunks = split_stream(
        source.lines(),
        |line, line_no| parser.classify(line, line_no),
        |line, line_no| {
            Diagnostic::parse(format!("Dump line not inside a group: '{}'", line)).at_line(line_no)
        },
    )
    .map_err(|d| d.in_file(name))?;

    let mut passes = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let pass = Pass::new(chunk.name, chunk.lines, chunk.start_line).map_err(|d| d.in_file(name))?;
        debug!(pass = %pass.name, lines = pass.body.len(), "parsed pass");
        passes.push(pass);
    }

    Ok(DumpFile {
        name: name.to_string(),
        passes,
    })
}
