//! Test fixtures for common test scenarios.
//!
//! Builders for on-disk projects and recipe registries so tests can
//! assemble realistic directory trees in a few lines.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fixture for a consumer project with a recipe and support files.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project name, used as the directory name.
    pub name: String,
    /// Slipway.toml content.
    pub recipe: String,
    /// Extra files (path relative to the project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a fixture with an empty recipe.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            recipe: String::new(),
            files: BTreeMap::new(),
        }
    }

    /// Create a minimal application fixture.
    pub fn application(name: impl Into<String>) -> Self {
        let name = name.into();
        let recipe = recipes::application(&name, "0.1.0");
        ProjectFixture {
            name,
            recipe,
            files: BTreeMap::new(),
        }
    }

    /// Set the recipe content.
    pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = recipe.into();
        self
    }

    /// Add a file under the project root.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Point the project at a registry and a stand-in build tool via
    /// its `.slipway/config.toml`.
    ///
    /// `true` works as the tool when a test only cares about
    /// orchestration, not real cmake output.
    pub fn with_config(self, registry: &Path, tool: &str) -> Self {
        let config = format!(
            "[registry]\nroot = \"{}\"\n\n[tool]\ncmake = \"{}\"\n",
            registry.display(),
            tool
        );
        self.with_file(PathBuf::from(".slipway").join("config.toml"), config)
    }

    /// Write this fixture to a real directory, returning the project path.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let project_path = base_path.join(&self.name);
        std::fs::create_dir_all(&project_path)?;

        std::fs::write(project_path.join("Slipway.toml"), &self.recipe)?;

        for (rel_path, content) in &self.files {
            let full_path = project_path.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(project_path)
    }
}

/// Fixture for a directory registry.
///
/// Entries land under `<root>/<name>/<version>/` with the layout the
/// registry scanner expects.
#[derive(Debug, Clone, Default)]
pub struct RegistryFixture {
    entries: Vec<RegistryEntry>,
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    name: String,
    version: String,
    recipe: String,
    headers: Vec<PathBuf>,
    libs: Vec<PathBuf>,
    build_script: bool,
}

impl RegistryFixture {
    /// Create an empty registry fixture.
    pub fn new() -> Self {
        RegistryFixture::default()
    }

    /// Add an entry with an explicit recipe.
    pub fn with_entry(mut self, name: &str, version: &str, recipe: impl Into<String>) -> Self {
        self.entries.push(RegistryEntry {
            name: name.to_string(),
            version: version.to_string(),
            recipe: recipe.into(),
            headers: Vec::new(),
            libs: Vec::new(),
            build_script: false,
        });
        self
    }

    /// Add a plain prebuilt entry with a minimal recipe.
    pub fn with_package(self, name: &str, version: &str) -> Self {
        let recipe = recipes::library(name, version);
        self.with_entry(name, version, recipe)
    }

    /// Add a header file under `include/` of the most recent entry.
    pub fn with_header(mut self, rel_path: impl Into<PathBuf>) -> Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.headers.push(rel_path.into());
        }
        self
    }

    /// Add a library file under `lib/` of the most recent entry.
    pub fn with_lib(mut self, rel_path: impl Into<PathBuf>) -> Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.libs.push(rel_path.into());
        }
        self
    }

    /// Mark the most recent entry as building from source.
    pub fn with_build_script(mut self) -> Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.build_script = true;
        }
        self
    }

    /// Write the registry to a real directory, returning its root.
    pub fn write_to(&self, root: &Path) -> std::io::Result<PathBuf> {
        for entry in &self.entries {
            let dir = root.join(&entry.name).join(&entry.version);
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join("Slipway.toml"), &entry.recipe)?;

            for header in &entry.headers {
                let path = dir.join("include").join(header);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, "#pragma once\n")?;
            }
            for lib in &entry.libs {
                let path = dir.join("lib").join(lib);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, "")?;
            }
            if entry.build_script {
                std::fs::write(
                    dir.join("CMakeLists.txt"),
                    format!(
                        "cmake_minimum_required(VERSION 3.15)\nproject({})\n",
                        entry.name
                    ),
                )?;
            }
        }
        Ok(root.to_path_buf())
    }
}

/// Common recipe templates.
pub mod recipes {
    /// A minimal application recipe.
    pub fn application(name: &str, version: &str) -> String {
        format!(
            r#"[package]
name = "{name}"
version = "{version}"
type = "application"
"#
        )
    }

    /// A minimal library recipe.
    pub fn library(name: &str, version: &str) -> String {
        format!(
            r#"[package]
name = "{name}"
version = "{version}"
type = "library"
"#
        )
    }

    /// An application recipe with regular requirements.
    pub fn application_with_requires(name: &str, version: &str, requires: &[(&str, &str)]) -> String {
        let mut out = application(name, version);
        out.push_str("\n[requires]\n");
        for (dep, req) in requires {
            out.push_str(&format!("{} = \"{}\"\n", dep, req));
        }
        out
    }

    /// A library recipe with the usual shared/fPIC option pair and the
    /// Windows fPIC removal rule.
    pub fn library_with_options(name: &str, version: &str) -> String {
        format!(
            r#"[package]
name = "{name}"
version = "{version}"
type = "library"

[options.shared]
values = [false, true]
default = false

[options.fPIC]
values = [false, true]
default = true

[[rules]]
when = {{ os = "Windows" }}
remove = ["fPIC"]
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_fixture_writes_tree() {
        let tmp = TempDir::new().unwrap();
        let path = ProjectFixture::application("app")
            .with_file("include/app.h", "#pragma once\n")
            .write_to(tmp.path())
            .unwrap();

        assert!(path.join("Slipway.toml").is_file());
        assert!(path.join("include").join("app.h").is_file());
    }

    #[test]
    fn test_registry_fixture_layout() {
        let tmp = TempDir::new().unwrap();
        let root = RegistryFixture::new()
            .with_package("chesscore", "1.0.0")
            .with_header("chess/board.h")
            .with_lib("libchesscore.a")
            .with_package("catch2", "3.7.1")
            .with_build_script()
            .write_to(tmp.path())
            .unwrap();

        let entry = root.join("chesscore").join("1.0.0");
        assert!(entry.join("Slipway.toml").is_file());
        assert!(entry.join("include").join("chess").join("board.h").is_file());
        assert!(entry.join("lib").join("libchesscore.a").is_file());
        assert!(root
            .join("catch2")
            .join("3.7.1")
            .join("CMakeLists.txt")
            .is_file());
    }
}
