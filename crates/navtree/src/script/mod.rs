//! Reading and writing the generated navigation data scripts.
//!
//! A data script is a sequence of top level assignments such as:
//!
//! ```text
//! var NAVTREE =
//! [
//!   [ "termstyle", "index.html", [
//!     [ "Features", "index.html#autotoc_md12", null ]
//!   ] ]
//! ];
//!
//! var SYNCONMSG = 'click to disable panel synchronisation';
//! ```
//!
//! Every right hand side is a JSON literal or a single-quoted string.

mod parser;
mod writer;

pub use parser::Position;
pub(crate) use writer::*;

use serde_json::Value;
use std::str::FromStr;

use crate::error::NavError;

use self::parser::ScriptParser;

/// The assignments of a navigation data script, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavScript {
    assignments: Vec<(String, Value)>,
}

impl NavScript {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignments
            .iter()
            .find(|(assigned, _)| assigned == name)
            .map(|(_, value)| value)
    }

    /// The string assigned to `name`, if any.
    pub fn string(&self, name: &str) -> Result<Option<&str>, NavError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(_) => Err(NavError::malformed(name, "expected a string")),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.assignments.iter().map(|(name, _)| name.as_str())
    }

    /// Records an assignment. A later assignment to the same name replaces the
    /// earlier one, as it would when the script runs.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();

        match self.assignments.iter_mut().find(|(assigned, _)| *assigned == name) {
            Some((_, current)) => *current = value,
            None => self.assignments.push((name, value)),
        }
    }
}

impl FromStr for NavScript {
    type Err = NavError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        ScriptParser::new(source).parse()
    }
}
