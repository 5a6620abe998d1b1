use std::collections::HashMap;

use log::warn;

use crate::error::Error;
use crate::LeniencyLevel;

/// Where each label name is defined: name -> position of its Label token in the stream.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    positions: HashMap<String, Definition>,
}

#[derive(Clone, Copy, Debug)]
struct Definition {
    position: usize,
    source_line: usize,
}

impl LabelTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records that `name` is defined by the token at `position`.
    ///
    /// A redefinition is an error when strict; when lenient the later definition wins.
    pub(crate) fn define(&mut self, name: &str, position: usize, source_line: usize, text: &str, leniency: &LeniencyLevel) -> Result<(), Error> {
        let definition = Definition { position, source_line };
        if let Some(previous) = self.positions.get(name) {
            if !leniency.duplicate_labels_allowed() {
                return Err(Error::DuplicateLabel {
                    line: source_line,
                    text: text.to_string(),
                    label: name.to_string(),
                    first_line: previous.source_line,
                });
            }
            warn!("label :{} on line {} replaces the one on line {}", name, source_line, previous.source_line);
        }
        self.positions.insert(name.to_string(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).map(|definition| definition.position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item=&str> {
        self.positions.keys().map(String::as_str)
    }
}
