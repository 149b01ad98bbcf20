//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::settings::InvalidValue;
use crate::registry::RegistryError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during recipe evaluation or dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),

    #[error("version conflict for `{package}`")]
    VersionConflict {
        package: String,
        requirements: Vec<(String, String)>, // (requirer, requirement)
    },

    #[error("cycle detected in dependency graph")]
    CycleDetected { packages: Vec<String> },

    #[error("dependency `{package}` is unavailable")]
    Unavailable {
        package: String,
        requirer: String,
        requirement: String,
        available: Vec<String>,
        #[source]
        source: Option<RegistryError>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::InvalidValue(err) => err.to_diagnostic(),

            ResolveError::VersionConflict {
                package,
                requirements,
            } => {
                let mut diag = Diagnostic::error(format!("version conflict for `{}`", package));

                for (requirer, req) in requirements {
                    diag =
                        diag.with_context(format!("`{}` requires {} {}", requirer, package, req));
                }

                diag.with_suggestion(format!(
                    "Align the version requirements for `{}` across the graph",
                    package
                ))
            }

            ResolveError::CycleDetected { packages } => {
                Diagnostic::error("cycle detected in dependency graph")
                    .with_context(format!("cycle: {}", packages.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing or restructuring requirements".to_string(),
                    )
            }

            ResolveError::Unavailable {
                package,
                requirer,
                requirement,
                available,
                source,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "no version of `{}` satisfies `{}` (required by `{}`)",
                    package, requirement, requirer
                ));

                if !available.is_empty() {
                    diag =
                        diag.with_context(format!("available versions: {}", available.join(", ")));
                }
                if let Some(cause) = source {
                    diag = diag.with_context(format!("{}", cause));
                }

                diag.with_suggestion(suggestions::CHECK_REGISTRY.to_string())
            }
        }
    }
}
