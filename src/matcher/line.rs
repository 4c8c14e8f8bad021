//! Matching a single assertion against a single dump line.
//!
//! The assertion is split at its separators into words. Each word has to
//! match one whole whitespace-delimited word of the line, in order, with any
//! number of unmatched line words in between.

use regex::Regex;

use super::Variables;
use crate::annotation::{Assertion, Expression};
use crate::diagnostic::Diagnostic;

enum Atom {
    /// Anchored at the start of what is left of the word.
    Regex(Regex),
    Ref(String),
    Def(String, Regex),
}

/// An assertion with its patterns compiled once for repeated line matching.
pub struct CompiledAssertion<'a> {
    assertion: &'a Assertion,
    words: Vec<Vec<Atom>>,
}

fn anchored(pattern: &str, line: usize) -> Result<Regex, Diagnostic> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|error| {
        Diagnostic::parse(format!("Invalid pattern '{}'", pattern))
            .at_line(line)
            .with_note(error.to_string())
    })
}

impl<'a> CompiledAssertion<'a> {
    pub fn new(assertion: &'a Assertion) -> Result<Self, Diagnostic> {
        let mut words = vec![Vec::new()];
        for expression in &assertion.expressions {
            let atom = match expression {
                Expression::Separator => {
                    words.push(Vec::new());
                    continue;
                }
                Expression::PlainText(text) => anchored(&regex::escape(text), assertion.line)?,
                Expression::Pattern(pattern) => anchored(pattern, assertion.line)?,
                Expression::VarRef(name) => {
                    push_atom(&mut words, Atom::Ref(name.clone()));
                    continue;
                }
                Expression::VarDef { name, pattern } => {
                    let regex = anchored(pattern, assertion.line)?;
                    push_atom(&mut words, Atom::Def(name.clone(), regex));
                    continue;
                }
            };
            push_atom(&mut words, Atom::Regex(atom));
        }
        Ok(Self { assertion, words })
    }

    /// Match against `line`. `Ok(None)` is an ordinary mismatch; errors are
    /// unbound references and redefinitions.
    pub fn match_line(&self, line: &str, variables: &Variables) -> Result<Option<Variables>, Diagnostic> {
        let mut string_words = line.split_whitespace();
        let mut variables = variables.clone();

        'words: for word in &self.words {
            for string_word in string_words.by_ref() {
                if let Some(bound) = self.match_word(word, string_word, &variables)? {
                    variables = bound;
                    continue 'words;
                }
            }
            return Ok(None);
        }
        Ok(Some(variables))
    }

    fn match_word(&self, word: &[Atom], string_word: &str, variables: &Variables) -> Result<Option<Variables>, Diagnostic> {
        let line = self.assertion.line;
        let mut rest = string_word;
        let mut variables = variables.clone();

        for atom in word {
            let consumed = match atom {
                Atom::Regex(regex) => match regex.find(rest) {
                    Some(m) => m.end(),
                    None => return Ok(None),
                },
                Atom::Ref(name) => {
                    let value = variables.lookup(name, line)?;
                    if !rest.starts_with(value) {
                        return Ok(None);
                    }
                    value.len()
                }
                Atom::Def(name, regex) => match regex.find(rest) {
                    Some(m) => {
                        variables = variables.define(name, m.as_str(), line)?;
                        m.end()
                    }
                    None => return Ok(None),
                },
            };
            rest = &rest[consumed..];
        }

        Ok(rest.is_empty().then_some(variables))
    }
}

fn push_atom(words: &mut Vec<Vec<Atom>>, atom: Atom) {
    if let Some(word) = words.last_mut() {
        word.push(atom);
    }
}

/// One-shot form of [`CompiledAssertion::match_line`].
pub fn match_line(assertion: &Assertion, line: &str, variables: &Variables) -> Result<Option<Variables>, Diagnostic> {
    CompiledAssertion::new(assertion)?.match_line(line, variables)
}
