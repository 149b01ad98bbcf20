//! Settings axes - the build configuration vocabulary.
//!
//! A Settings instance holds the declared axes (os, arch, compiler,
//! compiler.version, build_type) with their value domains and the values
//! chosen for one evaluation. Axes are kept ordered so that fingerprints
//! and generated files are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;
use crate::util::process::ProcessBuilder;

/// Allowed values for the `os` axis.
pub const OS_VALUES: &[&str] = &["Linux", "Windows", "Macos", "FreeBSD"];

/// Allowed values for the `arch` axis.
pub const ARCH_VALUES: &[&str] = &["x86", "x86_64", "armv8"];

/// Allowed values for the `compiler` axis.
pub const COMPILER_VALUES: &[&str] = &["gcc", "clang", "apple-clang", "msvc"];

/// Allowed values for the `build_type` axis.
pub const BUILD_TYPE_VALUES: &[&str] = &["Debug", "Release", "RelWithDebInfo", "MinSizeRel"];

/// Error raised when a settings or options assignment is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidValue {
    #[error("unknown {kind} `{name}`")]
    Unknown {
        kind: &'static str,
        name: String,
        known: Vec<String>,
    },

    #[error("invalid value `{value}` for {kind} `{name}`")]
    OutOfDomain {
        kind: &'static str,
        name: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl InvalidValue {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InvalidValue::Unknown { kind, name, known } => {
                let mut diag = Diagnostic::error(format!("unknown {} `{}`", kind, name));
                if !known.is_empty() {
                    diag = diag.with_context(format!("declared {}s: {}", kind, known.join(", ")));
                }
                diag.with_suggestion(format!("Check the spelling of `{}`", name))
            }
            InvalidValue::OutOfDomain {
                kind,
                name,
                value,
                allowed,
            } => Diagnostic::error(format!(
                "invalid value `{}` for {} `{}`",
                value, kind, name
            ))
            .with_context(format!("allowed values: {}", allowed.join(", ")))
            .with_suggestion(format!("Pick one of the allowed values for `{}`", name)),
        }
    }
}

/// One declared axis: its value domain and current value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Axis {
    /// Allowed values (None = unrestricted, e.g. compiler.version)
    domain: Option<Vec<String>>,

    /// Currently assigned value
    value: Option<String>,
}

/// Ordered settings axes with declared domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    axes: BTreeMap<String, Axis>,
}

impl Settings {
    /// Create an empty settings table with no declared axes.
    pub fn new() -> Self {
        Settings::default()
    }

    /// Create the built-in settings vocabulary with no values assigned.
    pub fn builtin() -> Self {
        let mut settings = Settings::new();
        settings.declare("os", Some(OS_VALUES), None);
        settings.declare("arch", Some(ARCH_VALUES), None);
        settings.declare("compiler", Some(COMPILER_VALUES), None);
        settings.declare("compiler.version", None, None);
        settings.declare("build_type", Some(BUILD_TYPE_VALUES), None);
        settings
    }

    /// Detect host settings from the running platform.
    ///
    /// Maps `std::env::consts::{OS, ARCH}` into the vocabulary, picks the
    /// conventional compiler for the OS and defaults build_type to Release.
    /// Axes the host cannot be mapped onto are left unset.
    pub fn host() -> Self {
        let mut settings = Settings::builtin();

        let os = match std::env::consts::OS {
            "linux" => Some("Linux"),
            "windows" => Some("Windows"),
            "macos" => Some("Macos"),
            "freebsd" => Some("FreeBSD"),
            other => {
                tracing::debug!("unrecognized host os `{}`, leaving os unset", other);
                None
            }
        };
        let arch = match std::env::consts::ARCH {
            "x86" => Some("x86"),
            "x86_64" => Some("x86_64"),
            "aarch64" => Some("armv8"),
            other => {
                tracing::debug!("unrecognized host arch `{}`, leaving arch unset", other);
                None
            }
        };
        let compiler = match os {
            Some("Linux") => Some("gcc"),
            Some("Macos") => Some("apple-clang"),
            Some("Windows") => Some("msvc"),
            Some("FreeBSD") => Some("clang"),
            _ => None,
        };

        // The built-in domains cover everything assigned here.
        if let Some(os) = os {
            let _ = settings.set("os", os);
        }
        if let Some(arch) = arch {
            let _ = settings.set("arch", arch);
        }
        if let Some(compiler) = compiler {
            let _ = settings.set("compiler", compiler);
            if let Some(version) = detect_compiler_version(compiler) {
                let _ = settings.set("compiler.version", &version);
            }
        }
        let _ = settings.set("build_type", "Release");

        settings
    }

    /// Declare an axis with an optional value domain and optional initial value.
    ///
    /// The initial value is assumed to lie inside the domain; external values
    /// go through [`Settings::set`].
    pub fn declare(&mut self, axis: &str, domain: Option<&[&str]>, value: Option<&str>) {
        self.axes.insert(
            axis.to_string(),
            Axis {
                domain: domain.map(|d| d.iter().map(|s| s.to_string()).collect()),
                value: value.map(String::from),
            },
        );
    }

    /// Assign a value to a declared axis.
    ///
    /// Fails with [`InvalidValue`] when the axis is unknown or the value lies
    /// outside the axis domain.
    pub fn set(&mut self, axis: &str, value: &str) -> Result<(), InvalidValue> {
        let Some(entry) = self.axes.get_mut(axis) else {
            return Err(InvalidValue::Unknown {
                kind: "setting",
                name: axis.to_string(),
                known: self.axes.keys().cloned().collect(),
            });
        };

        if let Some(ref domain) = entry.domain {
            if !domain.iter().any(|v| v == value) {
                return Err(InvalidValue::OutOfDomain {
                    kind: "setting",
                    name: axis.to_string(),
                    value: value.to_string(),
                    allowed: domain.clone(),
                });
            }
        }

        entry.value = Some(value.to_string());
        Ok(())
    }

    /// Remove an axis entirely. Removing an absent axis is a no-op.
    pub fn remove(&mut self, axis: &str) {
        self.axes.remove(axis);
    }

    /// Restrict the table to the given axes, dropping all others.
    ///
    /// Recipes list the axes they consume in `[package] settings`; axes the
    /// recipe does not consume must not influence its fingerprint.
    pub fn retain_axes(&mut self, axes: &[String]) {
        self.axes.retain(|name, _| {
            axes.iter()
                .any(|a| a == name || name.starts_with(&format!("{}.", a)))
        });
    }

    /// Get the value assigned to an axis.
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.axes.get(axis).and_then(|a| a.value.as_deref())
    }

    /// Check whether an axis is declared.
    pub fn is_declared(&self, axis: &str) -> bool {
        self.axes.contains_key(axis)
    }

    /// Iterate over declared axes in order.
    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    /// Iterate over (axis, value) pairs that have values, in axis order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.axes
            .iter()
            .filter_map(|(name, axis)| axis.value.as_deref().map(|v| (name.as_str(), v)))
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (axis, value) in self.values() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", axis, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Probe the toolchain for the compiler's major.minor version.
///
/// Best effort: any probe failure simply leaves compiler.version unset.
fn detect_compiler_version(compiler: &str) -> Option<String> {
    let program = match compiler {
        "gcc" => "gcc",
        "clang" | "apple-clang" => "clang",
        // cl.exe prints its banner without arguments but is rarely on PATH
        // outside a developer prompt; skip the probe.
        _ => return None,
    };

    let output = ProcessBuilder::new(program).arg("--version").exec().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    for line in stdout.lines() {
        for word in line.split_whitespace() {
            if word.chars().next()?.is_ascii_digit() {
                let parts: Vec<&str> = word.split('.').collect();
                if parts.len() >= 2 {
                    return Some(format!("{}.{}", parts[0], parts[1]));
                }
            }
        }
    }

    None
}
