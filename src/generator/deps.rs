//! Dependency descriptor generation.
//!
//! One file per dependency and build type, `<name>-<buildtype>.cmake`,
//! defining `<NAME>_FOUND`, `<NAME>_VERSION`, `<NAME>_INCLUDE_DIRS`,
//! `<NAME>_LIB_DIRS` and `<NAME>_LIBRARIES`, and appending the include
//! and library paths to cmake's search paths. Test-only dependencies get
//! the same shape under the `test/` subdirectory and are never referenced
//! from the regular descriptors.

use std::path::{Path, PathBuf};

use crate::core::ConfigSnapshot;
use crate::generator::GeneratedFile;
use crate::layout::Layout;
use crate::resolver::{PackageGraph, PackageNode};

/// Render descriptors for every dependency of both graphs.
///
/// The root package itself gets no descriptor; consumers find it through
/// its own packaging, not through the generators directory.
pub fn dependency_files(
    graph: &PackageGraph,
    test_graph: &PackageGraph,
    snapshot: &ConfigSnapshot,
    layout: &Layout,
) -> Vec<GeneratedFile> {
    let build_type = snapshot.build_type().unwrap_or("default").to_lowercase();
    let mut files = Vec::new();

    for (_, node) in graph.dependencies() {
        files.push(descriptor(node, &build_type, layout.generators_dir(), None));
    }

    // A test dependency carrying its own build script is built in
    // isolation; its descriptor points at that build tree instead of the
    // registry entry.
    let test_dir = layout.test_generators_dir();
    for (id, node) in test_graph.packages() {
        let lib_override = node
            .summary()
            .has_build_script()
            .then(|| layout.test_dep_build_dir(id.name()));
        files.push(descriptor(node, &build_type, &test_dir, lib_override));
    }

    files
}

fn descriptor(
    node: &PackageNode,
    build_type: &str,
    dir: &Path,
    lib_override: Option<PathBuf>,
) -> GeneratedFile {
    let name = node.id().name();
    let var = cmake_var_name(name);
    let artifacts = node.summary().artifacts();
    let lib_dir = lib_override.or_else(|| artifacts.lib_dir.clone());

    let mut lines: Vec<String> = vec![
        "# Generated by slipway. Do not edit.".to_string(),
        String::new(),
        format!("set({}_FOUND TRUE)", var),
        format!("set({}_VERSION \"{}\")", var, node.id().version()),
    ];
    if let Some(include_dir) = &artifacts.include_dir {
        lines.push(format!(
            "set({}_INCLUDE_DIRS \"{}\")",
            var,
            include_dir.display()
        ));
    }
    if let Some(lib_dir) = &lib_dir {
        lines.push(format!("set({}_LIB_DIRS \"{}\")", var, lib_dir.display()));
    }
    lines.push(format!("set({}_LIBRARIES {})", var, name));

    if artifacts.include_dir.is_some() || lib_dir.is_some() {
        lines.push(String::new());
    }
    if let Some(include_dir) = &artifacts.include_dir {
        lines.push(format!(
            "list(APPEND CMAKE_INCLUDE_PATH \"{}\")",
            include_dir.display()
        ));
    }
    if let Some(lib_dir) = &lib_dir {
        lines.push(format!(
            "list(APPEND CMAKE_LIBRARY_PATH \"{}\")",
            lib_dir.display()
        ));
    }

    GeneratedFile {
        path: dir.join(format!("{}-{}.cmake", name, build_type)),
        contents: lines.join("\n") + "\n",
    }
}

/// Uppercase a package name into a cmake variable prefix.
fn cmake_var_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
