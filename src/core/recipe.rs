//! Slipway.toml recipe parsing and schema.
//!
//! The recipe is the central configuration file for a Slipway package. It
//! declares the consumed settings axes, the package options with their
//! domains and defaults, conditional option removal rules, regular and
//! test-only requirements and the packaging file lists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::options::{OptionRule, OptionSet, OptionValue};
use crate::core::requirement::{Requirement, RequirementSpec};
use crate::core::settings::Settings;
use crate::core::PackageId;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// File name of the recipe manifest.
pub const RECIPE_FILE_NAME: &str = "Slipway.toml";

/// Error locating a recipe file.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("could not find {} in `{}` or any parent directory", RECIPE_FILE_NAME, dir.display())]
    NotFound { dir: PathBuf },
}

impl RecipeError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RecipeError::NotFound { dir } => Diagnostic::error(format!(
                "could not find {} in `{}` or any parent directory",
                RECIPE_FILE_NAME,
                dir.display()
            ))
            .with_suggestion(suggestions::NO_RECIPE),
        }
    }
}

/// Recipe parse failure with the offending span.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("failed to parse {name}")]
#[diagnostic(
    code(slipway::recipe::parse),
    help("Check the TOML syntax against the recipe schema")
)]
pub struct RecipeParseError {
    name: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("{message}")]
    span: Option<SourceSpan>,

    message: String,
}

/// Check a directory for a recipe file.
pub fn find_recipe_in(dir: &Path) -> Result<PathBuf, RecipeError> {
    let candidate = dir.join(RECIPE_FILE_NAME);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(RecipeError::NotFound {
            dir: dir.to_path_buf(),
        })
    }
}

/// What kind of artifact the package produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    #[default]
    Library,
    Application,
}

/// One declared option: value domain and default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub values: Vec<OptionValue>,
    pub default: OptionValue,
}

/// File patterns consumed by the package step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageFiles {
    /// Header globs, relative to the source dir
    #[serde(default)]
    pub include: Vec<String>,

    /// Library globs, relative to the build dir
    #[serde(default)]
    pub libs: Vec<String>,
}

impl PackageFiles {
    /// Check whether any patterns are declared.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.libs.is_empty()
    }
}

/// The parsed Slipway.toml recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Package name and version
    pub package_id: PackageId,

    /// Library or application
    pub package_type: PackageType,

    /// Settings axes this package consumes
    pub consumed_axes: Vec<String>,

    /// Per-package settings overrides from [settings]
    pub settings_overrides: BTreeMap<String, String>,

    /// Declared options from [options.*]
    pub option_decls: BTreeMap<String, OptionDecl>,

    /// Conditional option removal rules from [[rules]]
    pub rules: Vec<OptionRule>,

    /// Requirements, regular entries before test-only entries
    pub requirements: Vec<Requirement>,

    /// Packaging file patterns (None = packaging is a no-op)
    pub package_files: Option<PackageFiles>,

    /// The directory containing this recipe
    pub recipe_dir: PathBuf,
}

/// Raw recipe as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawRecipe {
    package: RawPackage,

    #[serde(default)]
    settings: BTreeMap<String, String>,

    #[serde(default)]
    options: BTreeMap<String, RawOption>,

    #[serde(default)]
    rules: Vec<OptionRule>,

    #[serde(default)]
    requires: BTreeMap<String, RequirementSpec>,

    #[serde(default, rename = "test-requires")]
    test_requires: BTreeMap<String, RequirementSpec>,

    #[serde(default, rename = "package-files")]
    package_files: Option<PackageFiles>,
}

/// Raw [package] section.
#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,

    version: String,

    #[serde(default, rename = "type")]
    package_type: PackageType,

    /// Consumed settings axes; absent means all built-in axes
    #[serde(default)]
    settings: Option<Vec<String>>,
}

/// Raw [options.*] entry.
#[derive(Debug, Deserialize)]
struct RawOption {
    values: Vec<OptionValue>,
    default: OptionValue,
}

impl Recipe {
    /// Load a recipe from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse recipe content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawRecipe =
            toml::from_str(content).map_err(|e| parse_error(path, content, &e))?;

        let recipe_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        validate_package_name(&raw.package.name, path)?;
        let version: Version = raw
            .package
            .version
            .parse()
            .with_context(|| format!("invalid version: {}", raw.package.version))?;

        let vocabulary = Settings::builtin();
        let consumed_axes = match raw.package.settings {
            Some(axes) => {
                for axis in &axes {
                    if !vocabulary.is_declared(axis) {
                        anyhow::bail!(
                            "unknown settings axis `{}` in [package] settings of {}",
                            axis,
                            path.display()
                        );
                    }
                }
                axes
            }
            None => vec![
                "arch".to_string(),
                "build_type".to_string(),
                "compiler".to_string(),
                "os".to_string(),
            ],
        };

        // Validate [settings] overrides against the vocabulary up front so a
        // broken recipe fails at load, not mid-resolution.
        let mut scratch = Settings::builtin();
        for (axis, value) in &raw.settings {
            scratch
                .set(axis, value)
                .map_err(|e| anyhow::anyhow!(e).context(format!(
                    "invalid [settings] override in {}",
                    path.display()
                )))?;
        }

        // Validate option declarations the same way.
        let mut option_decls = BTreeMap::new();
        let mut scratch_options = OptionSet::new();
        for (name, opt) in raw.options {
            scratch_options
                .declare(&name, opt.values.clone(), opt.default.clone())
                .map_err(|e| anyhow::anyhow!(e).context(format!(
                    "invalid [options.{}] declaration in {}",
                    name,
                    path.display()
                )))?;
            option_decls.insert(
                name,
                OptionDecl {
                    values: opt.values,
                    default: opt.default,
                },
            );
        }

        let mut requirements = Vec::new();
        for (name, spec) in &raw.requires {
            let req = spec.version_req().with_context(|| {
                format!("invalid version requirement for `{}`: `{}`", name, spec.version())
            })?;
            requirements.push(Requirement::new(name.clone(), req));
        }
        for (name, spec) in &raw.test_requires {
            let req = spec.version_req().with_context(|| {
                format!(
                    "invalid version requirement for test-only `{}`: `{}`",
                    name,
                    spec.version()
                )
            })?;
            requirements.push(Requirement::test(name.clone(), req));
        }

        Ok(Recipe {
            package_id: PackageId::new(raw.package.name, version),
            package_type: raw.package.package_type,
            consumed_axes,
            settings_overrides: raw.settings,
            option_decls,
            rules: raw.rules,
            requirements,
            package_files: raw.package_files,
            recipe_dir,
        })
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        self.package_id.name()
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        self.package_id.version()
    }

    /// Get the regular (non-test) requirements in name order.
    pub fn regular_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| !r.is_test())
    }

    /// Get the test-only requirements in name order.
    pub fn test_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.is_test())
    }

    /// Build the option table for this recipe: declared defaults only,
    /// rules not yet applied.
    pub fn default_options(&self) -> OptionSet {
        let mut options = OptionSet::new();
        for (name, decl) in &self.option_decls {
            // Declarations were validated at parse time.
            let _ = options.declare(name, decl.values.clone(), decl.default.clone());
        }
        options
    }
}

fn parse_error(path: &Path, content: &str, error: &toml::de::Error) -> anyhow::Error {
    anyhow::Error::new(RecipeParseError {
        name: path.display().to_string(),
        src: NamedSource::new(path.display().to_string(), content.to_string()),
        span: error.span().map(SourceSpan::from),
        message: error.message().to_string(),
    })
}

fn validate_package_name(name: &str, path: &Path) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("package name in {} must not be empty", path.display());
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if !valid {
        anyhow::bail!(
            "package name `{}` in {} contains invalid characters \
             (allowed: alphanumerics, `-`, `_`, `.`)",
            name,
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requirement::RequirementKind;

    const CHESS_RECIPE: &str = r#"
[package]
name = "chess-model"
version = "1.0.0"
type = "library"
settings = ["os", "compiler", "build_type", "arch"]

[options.shared]
values = [false, true]
default = false

[options.fPIC]
values = [false, true]
default = true

[[rules]]
when = { os = "Windows" }
remove = ["fPIC"]

[[rules]]
when = { shared = true }
remove = ["fPIC"]

[requires]
chesscore = "^1.0"

[test-requires]
catch2 = "3.7"

[package-files]
include = ["include/**/*.h"]
libs = ["**/*.a", "**/*.so"]
"#;

    #[test]
    fn test_parse_full_recipe() {
        let recipe = Recipe::parse(CHESS_RECIPE, Path::new("Slipway.toml")).unwrap();

        assert_eq!(recipe.name(), "chess-model");
        assert_eq!(recipe.version(), &Version::new(1, 0, 0));
        assert_eq!(recipe.package_type, PackageType::Library);
        assert_eq!(recipe.consumed_axes.len(), 4);
        assert_eq!(recipe.option_decls.len(), 2);
        assert_eq!(recipe.rules.len(), 2);
        assert!(recipe.package_files.is_some());

        let regular: Vec<_> = recipe.regular_requirements().collect();
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].name(), "chesscore");

        let test: Vec<_> = recipe.test_requirements().collect();
        assert_eq!(test.len(), 1);
        assert_eq!(test[0].name(), "catch2");
        assert_eq!(test[0].kind(), RequirementKind::Test);
    }

    #[test]
    fn test_regular_before_test() {
        let recipe = Recipe::parse(CHESS_RECIPE, Path::new("Slipway.toml")).unwrap();
        let kinds: Vec<_> = recipe.requirements.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![RequirementKind::Regular, RequirementKind::Test]);
    }

    #[test]
    fn test_requirements_sorted_by_name() {
        // The written order of the [requires] table does not survive
        // parsing; entries come back name-sorted.
        let recipe = Recipe::parse(
            "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[requires]\nzlib = \"^1.2\"\nfmt = \"^10.0\"\nboost = \"^1.80\"\n",
            Path::new("Slipway.toml"),
        )
        .unwrap();

        let names: Vec<_> = recipe.regular_requirements().map(|r| r.name()).collect();
        assert_eq!(names, vec!["boost", "fmt", "zlib"]);
    }

    #[test]
    fn test_minimal_recipe() {
        let recipe = Recipe::parse(
            "[package]\nname = \"tiny\"\nversion = \"0.1.0\"\n",
            Path::new("Slipway.toml"),
        )
        .unwrap();

        assert_eq!(recipe.package_type, PackageType::Library);
        assert_eq!(
            recipe.consumed_axes,
            vec!["arch", "build_type", "compiler", "os"]
        );
        assert!(recipe.requirements.is_empty());
        assert!(recipe.package_files.is_none());
        assert!(recipe.default_options().is_empty());
    }

    #[test]
    fn test_default_options_reflect_declarations() {
        let recipe = Recipe::parse(CHESS_RECIPE, Path::new("Slipway.toml")).unwrap();
        let options = recipe.default_options();

        assert_eq!(options.get("shared"), Some(&OptionValue::Bool(false)));
        assert_eq!(options.get("fPIC"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_invalid_version_rejected() {
        let result = Recipe::parse(
            "[package]\nname = \"tiny\"\nversion = \"not-a-version\"\n",
            Path::new("Slipway.toml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_consumed_axis_rejected() {
        let result = Recipe::parse(
            "[package]\nname = \"tiny\"\nversion = \"0.1.0\"\nsettings = [\"libc\"]\n",
            Path::new("Slipway.toml"),
        );
        assert!(result.unwrap_err().to_string().contains("libc"));
    }

    #[test]
    fn test_bad_settings_override_rejected() {
        let result = Recipe::parse(
            "[package]\nname = \"tiny\"\nversion = \"0.1.0\"\n\n[settings]\nos = \"Solaris\"\n",
            Path::new("Slipway.toml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_option_default_rejected() {
        let result = Recipe::parse(
            r#"
[package]
name = "tiny"
version = "0.1.0"

[options.shared]
values = [false, true]
default = "sometimes"
"#,
            Path::new("Slipway.toml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_syntax_error_carries_span() {
        let err = Recipe::parse("[package\nname = \"x\"\n", Path::new("Slipway.toml"))
            .unwrap_err();
        let parse_err = err.downcast_ref::<RecipeParseError>().unwrap();
        assert!(parse_err.span.is_some());
    }

    #[test]
    fn test_find_recipe_in() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(find_recipe_in(tmp.path()).is_err());

        std::fs::write(
            tmp.path().join(RECIPE_FILE_NAME),
            "[package]\nname = \"x\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        assert!(find_recipe_in(tmp.path()).is_ok());
    }
}
