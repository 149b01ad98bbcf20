//! Frozen evaluation result: settings plus options.
//!
//! After evaluation the settings and options of a package never change;
//! the snapshot is passed by reference through resolution, generation and
//! layout. Its fingerprint keys build directories and descriptor change
//! detection.

use std::fmt;

use crate::core::options::OptionSet;
use crate::core::recipe::Recipe;
use crate::core::settings::{InvalidValue, Settings};
use crate::util::hash::Fingerprint;

/// An immutable (settings, options) pair for one package evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    settings: Settings,
    options: OptionSet,
}

impl ConfigSnapshot {
    /// Freeze a settings/options pair.
    pub fn new(settings: Settings, options: OptionSet) -> Self {
        ConfigSnapshot { settings, options }
    }

    /// Evaluate a dependency recipe against base settings.
    ///
    /// The recipe's `[settings]` overrides are applied on top of the base,
    /// the table is restricted to the axes the recipe consumes, and the
    /// recipe's own removal rules run against its option defaults.
    pub fn for_recipe(base: &Settings, recipe: &Recipe) -> Result<Self, InvalidValue> {
        let mut settings = base.clone();
        for (axis, value) in &recipe.settings_overrides {
            settings.set(axis, value)?;
        }
        settings.retain_axes(&recipe.consumed_axes);

        let mut options = recipe.default_options();
        options.apply_rules(&settings, &recipe.rules)?;

        Ok(ConfigSnapshot::new(settings, options))
    }

    /// Get the frozen settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the frozen options.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Get the build type, when set.
    pub fn build_type(&self) -> Option<&str> {
        self.settings.get("build_type")
    }

    /// Fingerprint over the ordered settings and options.
    ///
    /// Any differing axis or option value yields a different fingerprint.
    pub fn fingerprint(&self) -> String {
        self.fingerprint_builder().finish()
    }

    /// First 8 hex characters of the fingerprint, used in directory names.
    pub fn fingerprint_short(&self) -> String {
        self.fingerprint_builder().finish_short()
    }

    fn fingerprint_builder(&self) -> Fingerprint {
        let mut fp = Fingerprint::new();
        fp.update_str("settings");
        for (axis, value) in self.settings.values() {
            fp.update_entry(axis, value);
        }
        fp.update_str("options");
        for (name, value) in self.options.values() {
            fp.update_entry(name, &value.to_string());
        }
        fp
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.settings)?;
        let options = format!("{}", self.options);
        if !options.is_empty() {
            write!(f, " | {}", options)?;
        }
        Ok(())
    }
}
