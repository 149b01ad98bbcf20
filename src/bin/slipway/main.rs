//! Slipway CLI - a recipe evaluator and build-graph orchestrator for
//! native libraries

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slipway::build::{BuildError, ConfigureError};
use slipway::core::recipe::{RecipeError, RecipeParseError};
use slipway::core::settings::InvalidValue;
use slipway::generator::GenerateError;
use slipway::resolver::ResolveError;
use slipway::util::diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    // Logs go to stderr; stdout is reserved for command payloads
    // (graph, completions).
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;
    let globals = cli.globals();

    // Execute command
    let result = match cli.command {
        Commands::Configure(args) => commands::configure::execute(&globals, args),
        Commands::Build(args) => commands::build::execute(&globals, args),
        Commands::Package(args) => commands::package::execute(&globals, args),
        Commands::Graph(args) => commands::graph::execute(&globals, args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        report(&e, color);
        std::process::exit(exit_code(&e));
    }
}

/// Render an error, preferring the structured diagnostic when one of
/// our error types is in the chain.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(parse) = err.downcast_ref::<RecipeParseError>() {
        eprintln!("{:?}", miette::Report::new(parse.clone()));
        return;
    }

    let diag = if let Some(e) = err.downcast_ref::<RecipeError>() {
        Some(e.to_diagnostic())
    } else if let Some(e) = err.downcast_ref::<InvalidValue>() {
        Some(e.to_diagnostic())
    } else if let Some(e) = err.downcast_ref::<ResolveError>() {
        Some(e.to_diagnostic())
    } else if let Some(e) = err.downcast_ref::<GenerateError>() {
        Some(e.to_diagnostic())
    } else if let Some(e) = err.downcast_ref::<ConfigureError>() {
        Some(e.to_diagnostic())
    } else if let Some(e) = err.downcast_ref::<BuildError>() {
        Some(e.to_diagnostic())
    } else {
        None
    };

    match diag {
        Some(d) => diagnostic::emit(&d, color),
        None => eprintln!("error: {:#}", err),
    }
}

/// Map the error chain to the documented exit codes: 1 for resolution
/// and evaluation failures, 2 for configure, 3 for build.
fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        3
    } else if err.downcast_ref::<ConfigureError>().is_some()
        || err.downcast_ref::<GenerateError>().is_some()
    {
        2
    } else {
        1
    }
}
