//! Core data structures for Slipway.
//!
//! This module contains the foundational types used throughout Slipway:
//! - Recipes and requirements
//! - Settings axes and package options
//! - Frozen configuration snapshots
//! - Package identity and summaries

pub mod options;
pub mod package_id;
pub mod recipe;
pub mod requirement;
pub mod settings;
pub mod snapshot;
pub mod summary;

pub use options::{OptionRule, OptionSet, OptionValue};
pub use package_id::PackageId;
pub use recipe::{Recipe, RecipeError, RECIPE_FILE_NAME};
pub use requirement::{Requirement, RequirementKind};
pub use settings::{InvalidValue, Settings};
pub use snapshot::ConfigSnapshot;
pub use summary::{ArtifactDirs, RecipeSummary};
