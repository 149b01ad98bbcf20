//! CLI integration tests for Slipway.
//!
//! These tests drive the binary end to end against temporary projects
//! and registries, with `true` (or a small script) standing in for the
//! real build tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command.
fn slipway() -> Command {
    Command::cargo_bin("slipway").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a project with a recipe and a config pointing the build tool
/// at a stand-in program.
fn write_project(base: &Path, recipe: &str, registry: &Path, tool: &str) -> PathBuf {
    let project = base.join("project");
    fs::create_dir_all(project.join(".slipway")).unwrap();
    fs::write(project.join("Slipway.toml"), recipe).unwrap();
    fs::write(
        project.join(".slipway").join("config.toml"),
        format!(
            "[registry]\nroot = \"{}\"\n\n[tool]\ncmake = \"{}\"\n",
            registry.display(),
            tool
        ),
    )
    .unwrap();
    project
}

/// Write one `<name>/<version>` registry entry, returning its directory.
fn write_registry_entry(root: &Path, name: &str, version: &str, body: &str) -> PathBuf {
    let dir = root.join(name).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("Slipway.toml"),
        format!(
            "[package]\nname = \"{}\"\nversion = \"{}\"\n{}",
            name, version, body
        ),
    )
    .unwrap();
    dir
}

/// Find the single configuration directory under `<project>/build`.
fn find_build_dir(project: &Path) -> PathBuf {
    let mut dirs: Vec<PathBuf> = fs::read_dir(project.join("build"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(dirs.len(), 1, "expected exactly one configuration dir");
    dirs.remove(0)
}

/// A fake build tool that succeeds on configure and fails on `--build`.
#[cfg(unix)]
fn write_failing_build_tool(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-cmake");
    fs::write(
        &path,
        "#!/bin/sh\ncase \"$1\" in\n  --build) exit 9 ;;\nesac\nexit 0\n",
    )
    .unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

const APP_RECIPE: &str = "[package]\nname = \"app\"\nversion = \"0.1.0\"\n";

// ============================================================================
// slipway configure
// ============================================================================

#[test]
fn test_configure_simple_project() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Configured"));

    let build_dir = find_build_dir(&project);
    assert!(build_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("release-"));

    let toolchain =
        fs::read_to_string(build_dir.join("generators").join("slipway_toolchain.cmake")).unwrap();
    assert!(toolchain.contains("set(CMAKE_BUILD_TYPE Release)"));
    assert!(build_dir.join(".slipway").join("state.json").is_file());
}

#[test]
fn test_configure_writes_dependency_descriptors() {
    let tmp = temp_dir();
    let registry = tmp.path().join("registry");
    let entry = write_registry_entry(&registry, "chesscore", "1.0.0", "");
    fs::create_dir_all(entry.join("include")).unwrap();

    let recipe = "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[requires]\nchesscore = \"^1.0\"\n";
    let project = write_project(tmp.path(), recipe, &registry, "true");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .success();

    let descriptor = find_build_dir(&project)
        .join("generators")
        .join("chesscore-release.cmake");
    let contents = fs::read_to_string(descriptor).unwrap();
    assert!(contents.contains("set(CHESSCORE_FOUND TRUE)"));
    assert!(contents.contains("set(CHESSCORE_VERSION \"1.0.0\")"));
}

#[test]
fn test_configure_twice_is_up_to_date() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .success();

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn test_configure_tool_failure_exits_2() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "false");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("configure step failed"));
}

// ============================================================================
// slipway build
// ============================================================================

#[test]
fn test_build_implies_configure() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["build"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Built"));

    // One invocation went from nothing to Built.
    let state =
        fs::read_to_string(find_build_dir(&project).join(".slipway").join("state.json")).unwrap();
    assert!(state.contains("built"));
}

#[cfg(unix)]
#[test]
fn test_build_step_failure_exits_3() {
    let tmp = temp_dir();
    let tool = write_failing_build_tool(tmp.path());
    let project = write_project(
        tmp.path(),
        APP_RECIPE,
        &tmp.path().join("registry"),
        &tool.display().to_string(),
    );

    slipway()
        .args(["build"])
        .current_dir(&project)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("build step failed"));

    // The failed build leaves the configure result behind for a retry.
    let state =
        fs::read_to_string(find_build_dir(&project).join(".slipway").join("state.json")).unwrap();
    assert!(state.contains("configured"));
}

#[test]
fn test_build_without_recipe_exits_1() {
    let tmp = temp_dir();

    slipway()
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Slipway.toml"));
}

// ============================================================================
// slipway package
// ============================================================================

#[test]
fn test_package_without_section_succeeds() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["package"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to package"))
        .stderr(predicate::str::contains("Packaged"));
}

#[test]
fn test_package_copies_declared_headers() {
    let tmp = temp_dir();
    let recipe = r#"[package]
name = "chess-model"
version = "1.0.0"
type = "library"

[package-files]
include = ["include/**/*.h"]
libs = ["**/*.a"]
"#;
    let project = write_project(tmp.path(), recipe, &tmp.path().join("registry"), "true");
    fs::create_dir_all(project.join("include").join("chess")).unwrap();
    fs::write(
        project.join("include").join("chess").join("board.h"),
        "#pragma once\n",
    )
    .unwrap();

    slipway()
        .args(["package"])
        .current_dir(&project)
        .assert()
        .success();

    let packaged = find_build_dir(&project)
        .join("package")
        .join("include")
        .join("chess")
        .join("board.h");
    assert!(packaged.is_file());
}

// ============================================================================
// slipway graph
// ============================================================================

#[test]
fn test_graph_prints_dependency_tree() {
    let tmp = temp_dir();
    let registry = tmp.path().join("registry");
    write_registry_entry(
        &registry,
        "chesscore",
        "1.0.0",
        "\n[requires]\nzlib = \"^1.0\"\n",
    );
    write_registry_entry(&registry, "zlib", "1.3.1", "");

    let recipe = "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[requires]\nchesscore = \"^1.0\"\n";
    let project = write_project(tmp.path(), recipe, &registry, "true");

    slipway()
        .args(["graph"])
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("app/0.1.0"))
        .stdout(predicate::str::contains("├── chesscore/1.0.0"))
        .stdout(predicate::str::contains("│   ├── zlib/1.3.1"));
}

#[test]
fn test_graph_shows_test_section() {
    let tmp = temp_dir();
    let registry = tmp.path().join("registry");
    write_registry_entry(&registry, "catch2", "3.7.1", "");

    let recipe =
        "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[test-requires]\ncatch2 = \"^3.0\"\n";
    let project = write_project(tmp.path(), recipe, &registry, "true");

    slipway()
        .args(["graph"])
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("[test]"))
        .stdout(predicate::str::contains("catch2/3.7.1"));
}

// ============================================================================
// resolution and evaluation failures
// ============================================================================

#[test]
fn test_missing_dependency_exits_1() {
    let tmp = temp_dir();
    let recipe = "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[requires]\nzlib = \"^1.0\"\n";
    let project = write_project(tmp.path(), recipe, &tmp.path().join("registry"), "true");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no version of `zlib`"));
}

#[test]
fn test_version_conflict_exits_1() {
    let tmp = temp_dir();
    let registry = tmp.path().join("registry");
    write_registry_entry(&registry, "liba", "1.0.0", "\n[requires]\nzlib = \"^1.0\"\n");
    write_registry_entry(&registry, "zlib", "1.0.0", "");
    write_registry_entry(&registry, "zlib", "2.0.0", "");

    let recipe = "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[requires]\nliba = \"^1.0\"\nzlib = \"^2.0\"\n";
    let project = write_project(tmp.path(), recipe, &registry, "true");

    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("version conflict for `zlib`"));
}

#[test]
fn test_invalid_setting_exits_1() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["configure", "-s", "os=Solaris"])
        .current_dir(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Solaris"));
}

#[test]
fn test_cli_overrides_change_the_configuration() {
    let tmp = temp_dir();
    let project = write_project(tmp.path(), APP_RECIPE, &tmp.path().join("registry"), "true");

    slipway()
        .args(["configure", "-s", "build_type=Debug"])
        .current_dir(&project)
        .assert()
        .success();

    let build_dir = find_build_dir(&project);
    assert!(build_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("debug-"));

    let toolchain =
        fs::read_to_string(build_dir.join("generators").join("slipway_toolchain.cmake")).unwrap();
    assert!(toolchain.contains("set(CMAKE_BUILD_TYPE Debug)"));
}

// ============================================================================
// slipway completions
// ============================================================================

#[test]
fn test_completions_bash() {
    slipway()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}

// ============================================================================
// Full workflow test
// ============================================================================

#[test]
fn test_full_workflow_with_dependencies() {
    let tmp = temp_dir();
    let registry = tmp.path().join("registry");

    // A prebuilt library with headers, which itself requires zlib.
    let chesscore = write_registry_entry(
        &registry,
        "chesscore",
        "1.0.0",
        "\n[requires]\nzlib = \"^1.0\"\n",
    );
    fs::create_dir_all(chesscore.join("include").join("chess")).unwrap();
    fs::write(
        chesscore.join("include").join("chess").join("board.h"),
        "#pragma once\n",
    )
    .unwrap();
    fs::create_dir_all(chesscore.join("lib")).unwrap();
    fs::write(chesscore.join("lib").join("libchesscore.a"), "").unwrap();

    write_registry_entry(&registry, "zlib", "1.3.1", "");

    // A test framework that builds from source.
    let catch2 = write_registry_entry(&registry, "catch2", "3.7.1", "");
    fs::write(
        catch2.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.15)\nproject(catch2)\n",
    )
    .unwrap();

    let recipe = r#"[package]
name = "app"
version = "0.1.0"

[requires]
chesscore = "^1.0"

[test-requires]
catch2 = "^3.0"
"#;
    let project = write_project(tmp.path(), recipe, &registry, "true");

    // 1. Inspect the graph.
    slipway()
        .args(["graph"])
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("chesscore/1.0.0"))
        .stdout(predicate::str::contains("zlib/1.3.1"))
        .stdout(predicate::str::contains("[test]"))
        .stdout(predicate::str::contains("catch2/3.7.1"));

    // 2. Configure: descriptors for both regular deps, the test dep in
    //    its own subdirectory, and an isolated test-dep build tree.
    slipway()
        .args(["configure"])
        .current_dir(&project)
        .assert()
        .success();

    let build_dir = find_build_dir(&project);
    let generators = build_dir.join("generators");
    assert!(generators.join("chesscore-release.cmake").is_file());
    assert!(generators.join("zlib-release.cmake").is_file());
    assert!(generators.join("test").join("catch2-release.cmake").is_file());

    let test_descriptor =
        fs::read_to_string(generators.join("test").join("catch2-release.cmake")).unwrap();
    assert!(test_descriptor.contains("test-deps"));

    // Regular descriptors never mention the test framework.
    let toolchain_dir_listing: Vec<String> = fs::read_dir(&generators)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(!toolchain_dir_listing.contains(&"catch2-release.cmake".to_string()));

    // 3. Build.
    slipway()
        .args(["build"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Built"));

    // 4. Package (no [package-files], still succeeds).
    slipway()
        .args(["package"])
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Packaged"));
}
