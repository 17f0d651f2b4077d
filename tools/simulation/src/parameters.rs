//! Run parameters
//!
//! Flat string map shared by every participant of a run. Configuration
//! strings may reference parameters as `${name}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use venue_types::errors::SimulationError;

/// Parameter set for a run; the batch runner sets `runIndex` per run
pub const RUN_INDEX: &str = "runIndex";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterStorage {
    values: BTreeMap<String, String>,
}

impl ParameterStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Result<&str, SimulationError> {
        self.try_get(name).ok_or_else(|| SimulationError::UnknownParameter {
            name: name.to_string(),
        })
    }

    pub fn try_get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Copy every entry of `other` into this storage, overwriting on conflict
    pub fn merge(&mut self, other: &ParameterStorage) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitute every `${name}` reference
    ///
    /// A `$` not followed by `{` is kept as is. Unknown names and an opening
    /// `${` without its closing `}` are errors.
    pub fn process_string(&self, input: &str) -> Result<String, SimulationError> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(dollar) = rest.find('$') {
            out.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            let Some(reference) = after.strip_prefix('{') else {
                out.push('$');
                rest = after;
                continue;
            };
            let Some(close) = reference.find('}') else {
                return Err(SimulationError::UnterminatedParameter {
                    input: input.to_string(),
                });
            };
            out.push_str(self.get(&reference[..close])?);
            rest = &reference[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterStorage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
