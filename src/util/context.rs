//! Global context for Slipway operations.
//!
//! Holds the working directory, the Slipway home directory, and the
//! registry root override. The context is created once in `main` and
//! threaded by reference through the ops layer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::recipe::{find_recipe_in, RecipeError};
use crate::util::config;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Slipway data (~/.slipway/)
    home: PathBuf,

    /// Registry root override (from config or `--registry`)
    registry_root: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".slipway"));

        Ok(GlobalContext {
            cwd,
            home,
            registry_root: None,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Set the registry root.
    pub fn set_registry_root(&mut self, root: PathBuf) {
        self.registry_root = Some(root);
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Slipway home directory (~/.slipway/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the recipe registry root.
    ///
    /// Defaults to `~/.slipway/registry` unless overridden by config or
    /// the `--registry` flag.
    pub fn registry_root(&self) -> PathBuf {
        self.registry_root
            .clone()
            .unwrap_or_else(|| self.home.join("registry"))
    }

    /// Get the explicit registry override, if one was set.
    ///
    /// Distinguishes `--registry <path>` from the default so config-file
    /// registry roots can slot in between the two.
    pub fn registry_override(&self) -> Option<&Path> {
        self.registry_root.as_deref()
    }

    /// Find the recipe file (Slipway.toml) starting from cwd and searching upward.
    ///
    /// Returns `RecipeError::NotFound` if no recipe exists in the directory tree.
    pub fn find_recipe(&self) -> Result<PathBuf, RecipeError> {
        let mut current = self.cwd.clone();
        loop {
            match find_recipe_in(&current) {
                Ok(path) => return Ok(path),
                Err(RecipeError::NotFound { .. }) => {
                    // Not in this directory, keep searching upward
                    if !current.pop() {
                        return Err(RecipeError::NotFound {
                            dir: self.cwd.clone(),
                        });
                    }
                }
            }
        }
    }
}
