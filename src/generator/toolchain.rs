//! Toolchain descriptor generation.
//!
//! Encodes the settings axes of a frozen snapshot in cmake's vocabulary.
//! One file per configuration, path `generators/slipway_toolchain.cmake`.

use crate::core::{ConfigSnapshot, OptionValue};
use crate::generator::{GenerateError, GeneratedFile, TOOLCHAIN_FILE_NAME};
use crate::layout::Layout;

/// Render the toolchain descriptor for a snapshot.
///
/// Axes without a value are omitted. An axis value that cannot be
/// expressed in cmake terms fails with
/// [`GenerateError::UnsupportedSetting`].
pub fn toolchain_file(
    snapshot: &ConfigSnapshot,
    layout: &Layout,
) -> Result<GeneratedFile, GenerateError> {
    let settings = snapshot.settings();
    let mut lines: Vec<String> = vec![
        "# Generated by slipway. Do not edit.".to_string(),
        format!("# configuration: {}", snapshot),
        String::new(),
    ];

    if let Some(build_type) = settings.get("build_type") {
        lines.push(format!("set(CMAKE_BUILD_TYPE {})", build_type));
    }

    if let Some(os) = settings.get("os") {
        lines.push(format!("set(CMAKE_SYSTEM_NAME {})", system_name(os)?));
    }

    if let Some(compiler) = settings.get("compiler") {
        let (cc, cxx) = compiler_pair(compiler)?;
        lines.push(format!("set(CMAKE_C_COMPILER {})", cc));
        lines.push(format!("set(CMAKE_CXX_COMPILER {})", cxx));
    }

    if let Some(arch) = settings.get("arch") {
        if let Some(flag) = arch_flag(arch)? {
            lines.push(format!("set(CMAKE_C_FLAGS_INIT \"{}\")", flag));
            lines.push(format!("set(CMAKE_CXX_FLAGS_INIT \"{}\")", flag));
        }
    }

    let options = snapshot.options();
    if let Some(OptionValue::Bool(pic)) = options.get("fPIC") {
        lines.push(format!(
            "set(CMAKE_POSITION_INDEPENDENT_CODE {})",
            on_off(*pic)
        ));
    }
    if let Some(OptionValue::Bool(shared)) = options.get("shared") {
        lines.push(format!("set(BUILD_SHARED_LIBS {})", on_off(*shared)));
    }

    Ok(GeneratedFile {
        path: layout.generators_dir().join(TOOLCHAIN_FILE_NAME),
        contents: lines.join("\n") + "\n",
    })
}

fn system_name(os: &str) -> Result<&'static str, GenerateError> {
    match os {
        "Linux" => Ok("Linux"),
        "Windows" => Ok("Windows"),
        "Macos" => Ok("Darwin"),
        "FreeBSD" => Ok("FreeBSD"),
        other => Err(GenerateError::UnsupportedSetting {
            axis: "os".to_string(),
            value: other.to_string(),
        }),
    }
}

fn compiler_pair(compiler: &str) -> Result<(&'static str, &'static str), GenerateError> {
    match compiler {
        "gcc" => Ok(("gcc", "g++")),
        "clang" | "apple-clang" => Ok(("clang", "clang++")),
        "msvc" => Ok(("cl", "cl")),
        other => Err(GenerateError::UnsupportedSetting {
            axis: "compiler".to_string(),
            value: other.to_string(),
        }),
    }
}

fn arch_flag(arch: &str) -> Result<Option<&'static str>, GenerateError> {
    match arch {
        "x86" => Ok(Some("-m32")),
        "x86_64" => Ok(Some("-m64")),
        // armv8 builds on a matching host need no width flag
        "armv8" => Ok(None),
        other => Err(GenerateError::UnsupportedSetting {
            axis: "arch".to_string(),
            value: other.to_string(),
        }),
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}
