use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, ErrorKind};

/// Variable bindings made by `<<NAME:regex>>` expressions.
///
/// Never modified in place: [`Variables::define`] returns a new set, so a
/// failed match attempt leaves the caller's bindings untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Look up a referenced variable. Referencing a name nobody bound is an
    /// authoring error, not a mismatch.
    pub fn lookup(&self, name: &str, line: usize) -> Result<&str, Diagnostic> {
        self.get(name).ok_or_else(|| {
            Diagnostic::error(
                ErrorKind::UnboundVariable,
                format!("Missing definition of variable \"{}\"", name),
            )
            .at_line(line)
            .with_note(format!("bound variables: {}", self))
        })
    }

    /// Bindings extended with `name = value`.
    pub fn define(&self, name: &str, value: &str, line: usize) -> Result<Variables, Diagnostic> {
        if self.0.contains_key(name) {
            return Err(Diagnostic::error(
                ErrorKind::VariableRedefinition,
                format!("Multiple definitions of variable \"{}\"", name),
            )
            .at_line(line)
            .with_note(format!("bound variables: {}", self)));
        }
        let mut map = self.0.clone();
        map.insert(name.to_string(), value.to_string());
        Ok(Variables(map))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", name, value)?;
        }
        write!(f, "}}")
    }
}
