//! External build tool invocation.
//!
//! The orchestrator drives the tool through a narrow trait: a configure
//! step against the generated toolchain descriptor and a build step
//! against a build directory. Both run with inherited stdio so the tool's
//! own diagnostics reach the user verbatim, and both surface the child's
//! exit code, never parse its output.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, ProcessBuilder};

/// The external tool's configure step exited non-zero.
#[derive(Debug, thiserror::Error)]
#[error("configure step failed with exit code {code}")]
pub struct ConfigureError {
    pub command: String,
    pub code: i32,
}

impl ConfigureError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!("configure step failed with exit code {}", self.code))
            .with_context(format!("command: {}", self.command))
            .with_suggestion(suggestions::TOOL_FAILED)
    }
}

/// The external tool's build step exited non-zero.
#[derive(Debug, thiserror::Error)]
#[error("build step failed with exit code {code}")]
pub struct BuildError {
    pub command: String,
    pub code: i32,
}

impl BuildError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!("build step failed with exit code {}", self.code))
            .with_context(format!("command: {}", self.command))
            .with_suggestion(suggestions::TOOL_FAILED)
    }
}

/// The narrow seam to the external build system.
pub trait BuildTool {
    /// Tool name for logs.
    fn name(&self) -> &str;

    /// Run the configure step for a source tree into a build directory,
    /// loading the given toolchain descriptor.
    fn configure(&self, source_dir: &Path, build_dir: &Path, toolchain: &Path) -> Result<()>;

    /// Run the build step for a configured build directory.
    fn build(&self, build_dir: &Path) -> Result<()>;
}

/// CMake, the shipped build tool.
pub struct CMakeTool {
    program: PathBuf,
    generator: Option<String>,
    jobs: Option<usize>,
}

impl CMakeTool {
    /// Locate cmake on PATH.
    pub fn new() -> Result<Self> {
        let Some(program) = find_cmake() else {
            bail!(
                "cmake not found\n\
                 \n\
                 cmake is required to configure and build packages.\n\
                 Install CMake and ensure it's in your PATH."
            );
        };
        Ok(CMakeTool {
            program,
            generator: None,
            jobs: None,
        })
    }

    /// Use an explicit cmake binary instead of searching PATH.
    pub fn with_program(program: PathBuf) -> Self {
        CMakeTool {
            program,
            generator: None,
            jobs: None,
        }
    }

    /// Select a cmake generator (`-G`).
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Cap the tool-side build parallelism.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Path of the underlying program.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self, source_dir: &Path, build_dir: &Path, toolchain: &Path) -> Result<()> {
        ensure_dir(build_dir)?;

        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(build_dir)
            .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));

        if let Some(ref generator) = self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        tracing::debug!("running {}", cmd.display_command());
        let status = cmd.status()?;
        if !status.success() {
            return Err(ConfigureError {
                command: cmd.display_command(),
                code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(())
    }

    fn build(&self, build_dir: &Path) -> Result<()> {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("--build")
            .arg(build_dir)
            .arg("--parallel");
        if let Some(jobs) = self.jobs {
            cmd = cmd.arg(jobs.to_string());
        }

        tracing::debug!("running {}", cmd.display_command());
        let status = cmd.status()?;
        if !status.success() {
            return Err(BuildError {
                command: cmd.display_command(),
                code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_succeeding_tool() {
        let tmp = TempDir::new().unwrap();
        let build_dir = tmp.path().join("build");

        // `true` ignores its arguments and exits zero.
        let tool = CMakeTool::with_program(PathBuf::from("true"));
        tool.configure(tmp.path(), &build_dir, &tmp.path().join("toolchain.cmake"))
            .unwrap();
        tool.build(&build_dir).unwrap();

        // configure creates the build directory up front
        assert!(build_dir.exists());
    }

    #[test]
    fn test_failing_configure_carries_exit_code() {
        let tmp = TempDir::new().unwrap();
        let tool = CMakeTool::with_program(PathBuf::from("false"));

        let err = tool
            .configure(
                tmp.path(),
                &tmp.path().join("build"),
                &tmp.path().join("toolchain.cmake"),
            )
            .unwrap_err();

        let configure_err = err.downcast_ref::<ConfigureError>().unwrap();
        assert_eq!(configure_err.code, 1);
    }

    #[test]
    fn test_failing_build_carries_exit_code() {
        let tmp = TempDir::new().unwrap();
        let tool = CMakeTool::with_program(PathBuf::from("false"));

        let err = tool.build(tmp.path()).unwrap_err();
        let build_err = err.downcast_ref::<BuildError>().unwrap();
        assert_eq!(build_err.code, 1);
    }

    #[test]
    fn test_diagnostic_mentions_command() {
        let err = BuildError {
            command: "cmake --build build".to_string(),
            code: 2,
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("exit code 2"));
        assert!(output.contains("cmake --build build"));
    }
}
