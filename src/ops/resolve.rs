//! Recipe evaluation and dependency resolution.
//!
//! Every command starts here: load the recipe, evaluate the root
//! settings/options from host defaults, config files and command-line
//! overrides, then resolve the dependency graph against the registry.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::{ConfigSnapshot, OptionValue, Recipe, RecipeSummary, Settings};
use crate::layout::Layout;
use crate::registry::DirRegistry;
use crate::resolver::{Resolution, Resolver};
use crate::util::config::{load_config, project_config_path, Config};
use crate::util::GlobalContext;

/// Command-line overrides applied during evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// `-s axis=value` pairs, applied last so they win over the recipe
    pub settings: Vec<(String, String)>,

    /// `-o name=value` pairs, applied after config defaults
    pub options: Vec<(String, String)>,
}

/// A fully evaluated and resolved project.
///
/// Produced once per invocation and shared by configure, build and
/// package so they all see the same snapshot and graph.
#[derive(Debug)]
pub struct Evaluated {
    /// The root recipe
    pub recipe: Recipe,

    /// Frozen settings/options of the root package
    pub snapshot: ConfigSnapshot,

    /// Resolved dependency graph plus the test-only sub-graph
    pub resolution: Resolution,

    /// Directory layout for this configuration
    pub layout: Layout,

    /// Merged configuration (global then project)
    pub config: Config,
}

/// Evaluate the recipe found from the context's working directory and
/// resolve its dependency graph.
///
/// Settings precedence on the root, lowest to highest: host detection,
/// config files, the recipe's `[settings]` table, `-s` pairs. The base
/// settings handed to dependencies skip the recipe's table because that
/// table only speaks for the root package.
pub fn resolve_project(ctx: &GlobalContext, opts: &EvalOptions) -> Result<Evaluated> {
    let recipe_path = ctx.find_recipe()?;
    let recipe = Recipe::load(&recipe_path)?;

    let project_root = recipe.recipe_dir.clone();
    let config = load_config(&ctx.config_path(), &project_config_path(&project_root));

    // Base settings shared by every package in the graph.
    let mut base = Settings::host();
    for (axis, value) in &config.settings {
        base.set(axis, value)
            .context("invalid setting in config")?;
    }

    let mut root_settings = base.clone();
    for (axis, value) in &recipe.settings_overrides {
        root_settings.set(axis, value).with_context(|| {
            format!("invalid [settings] entry in {}", recipe_path.display())
        })?;
    }

    for (axis, value) in &opts.settings {
        base.set(axis, value)?;
        root_settings.set(axis, value)?;
    }
    root_settings.retain_axes(&recipe.consumed_axes);

    let mut options = recipe.default_options();
    for (name, value) in &config.options {
        // Config files can carry options for other projects, so names the
        // recipe does not declare are skipped rather than rejected.
        if options.is_declared(name) {
            options.set(name, option_value_from_toml(value))?;
        } else {
            tracing::debug!(
                "config option `{}` is not declared by {}; ignoring",
                name,
                recipe.name()
            );
        }
    }
    for (name, raw) in &opts.options {
        options.set(name, OptionValue::parse(raw))?;
    }
    options.apply_rules(&root_settings, &recipe.rules)?;

    let snapshot = ConfigSnapshot::new(root_settings, options);
    tracing::debug!("evaluated {}: {}", recipe.package_id, snapshot);

    let registry_root = registry_root(ctx, &config);
    tracing::debug!("using registry at {}", registry_root.display());

    let mut registry = DirRegistry::new(registry_root);
    if let Some(build_type) = snapshot.build_type() {
        registry = registry.with_build_type(build_type);
    }

    let resolver = Resolver::new(&registry);
    let resolution = resolver.resolve(RecipeSummary::new(recipe.clone()), snapshot.clone(), &base)?;

    tracing::info!(
        "resolved {} dependencies ({} test-only) for {}",
        resolution.graph.dependencies().count(),
        resolution.test_graph.len(),
        recipe.package_id
    );

    let layout = Layout::new(&project_root, &snapshot);

    Ok(Evaluated {
        recipe,
        snapshot,
        resolution,
        layout,
        config,
    })
}

/// Pick the registry root: `--registry` beats the config file, which
/// beats `~/.slipway/registry`.
fn registry_root(ctx: &GlobalContext, config: &Config) -> PathBuf {
    match ctx.registry_override() {
        Some(root) => root.to_path_buf(),
        None => config
            .registry
            .root
            .clone()
            .unwrap_or_else(|| ctx.registry_root()),
    }
}

fn option_value_from_toml(value: &toml::Value) -> OptionValue {
    match value {
        toml::Value::Boolean(b) => OptionValue::Bool(*b),
        toml::Value::String(s) => OptionValue::Str(s.clone()),
        other => OptionValue::Str(other.to_string()),
    }
}
