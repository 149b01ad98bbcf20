//! Package options and conditional removal rules.
//!
//! Options are per-package knobs (`shared`, `fPIC`) with a declared value
//! domain and a default. Removal rules drop options whose premise no longer
//! applies for the frozen settings, e.g. fPIC on Windows. All triggered
//! rules are collected first and their removal sets unioned, then applied
//! in one subtraction, so the outcome never depends on rule order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::settings::{InvalidValue, Settings};

/// An option value: boolean or free-form string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Parse a command-line value: `true`/`false` become booleans,
    /// everything else stays a string.
    pub fn parse(raw: &str) -> OptionValue {
        match raw {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            _ => OptionValue::Str(raw.to_string()),
        }
    }

    /// Get the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

/// One declared option: domain, default and current value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OptionEntry {
    domain: Vec<OptionValue>,
    default: OptionValue,
    value: OptionValue,
}

/// The option table of one package evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: BTreeMap<String, OptionEntry>,
}

impl OptionSet {
    /// Create an empty option set.
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Declare an option with its domain and default value.
    ///
    /// The default must be a member of the domain.
    pub fn declare(
        &mut self,
        name: &str,
        domain: Vec<OptionValue>,
        default: OptionValue,
    ) -> Result<(), InvalidValue> {
        if !domain.contains(&default) {
            return Err(InvalidValue::OutOfDomain {
                kind: "option",
                name: name.to_string(),
                value: default.to_string(),
                allowed: domain.iter().map(|v| v.to_string()).collect(),
            });
        }

        self.options.insert(
            name.to_string(),
            OptionEntry {
                domain,
                value: default.clone(),
                default,
            },
        );
        Ok(())
    }

    /// Assign a value to a declared option.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), InvalidValue> {
        let Some(entry) = self.options.get_mut(name) else {
            return Err(InvalidValue::Unknown {
                kind: "option",
                name: name.to_string(),
                known: self.options.keys().cloned().collect(),
            });
        };

        if !entry.domain.contains(&value) {
            return Err(InvalidValue::OutOfDomain {
                kind: "option",
                name: name.to_string(),
                value: value.to_string(),
                allowed: entry.domain.iter().map(|v| v.to_string()).collect(),
            });
        }

        entry.value = value;
        Ok(())
    }

    /// Remove an option entirely. Removing an absent option is a no-op.
    pub fn remove(&mut self, name: &str) {
        self.options.remove(name);
    }

    /// Get the current value of an option.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name).map(|e| &e.value)
    }

    /// Get the declared default of an option.
    pub fn default_of(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name).map(|e| &e.default)
    }

    /// Check whether an option is declared.
    pub fn is_declared(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Check whether no options are declared.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Iterate over (name, value) pairs in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.options
            .iter()
            .map(|(name, entry)| (name.as_str(), &entry.value))
    }

    /// Evaluate removal rules against the frozen settings and this table,
    /// then apply the union of all triggered removal sets at once.
    ///
    /// Rules whose premise references an unknown setting or option fail with
    /// [`InvalidValue`]. Entries in a removal set that are already absent
    /// are skipped silently.
    pub fn apply_rules(
        &mut self,
        settings: &Settings,
        rules: &[OptionRule],
    ) -> Result<(), InvalidValue> {
        let mut removed: BTreeSet<String> = BTreeSet::new();
        for rule in rules {
            if rule.matches(settings, self)? {
                removed.extend(rule.remove.iter().cloned());
            }
        }
        for name in &removed {
            self.remove(name);
        }
        Ok(())
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.values() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// A conditional option removal rule.
///
/// `when` is a conjunction over settings axes and option values; when every
/// key matches, the options in `remove` are dropped from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRule {
    pub when: BTreeMap<String, OptionValue>,
    pub remove: Vec<String>,
}

impl OptionRule {
    /// Check whether every premise in `when` holds.
    ///
    /// Each key names either a settings axis or an option. An axis or option
    /// without a value never matches. A key naming neither fails with
    /// [`InvalidValue`] whatever the other premises evaluate to.
    pub fn matches(
        &self,
        settings: &Settings,
        options: &OptionSet,
    ) -> Result<bool, InvalidValue> {
        // Every key is checked before any premise is evaluated, so a
        // misspelled key cannot hide behind one that already failed.
        for key in self.when.keys() {
            if !settings.is_declared(key) && !options.is_declared(key) {
                let mut known: Vec<String> = settings.axes().map(String::from).collect();
                known.extend(options.values().map(|(name, _)| name.to_string()));
                return Err(InvalidValue::Unknown {
                    kind: "rule condition",
                    name: key.clone(),
                    known,
                });
            }
        }

        for (key, expected) in &self.when {
            if settings.is_declared(key) {
                let holds = settings
                    .get(key)
                    .map(|actual| actual == expected.to_string())
                    .unwrap_or(false);
                if !holds {
                    return Ok(false);
                }
            } else {
                let holds = options.get(key).map(|v| v == expected).unwrap_or(false);
                if !holds {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
