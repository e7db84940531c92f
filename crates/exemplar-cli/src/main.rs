//! exemplar CLI: turn a registry of example contracts into standalone projects.
//!
//! Commands cover the whole lifecycle of an examples repository:
//! `create-example`, `create-category`, `generate-docs`,
//! `generate-all-and-test`, `update-dependencies`, plus `list` and `check`
//! for inspecting the registry.
//!
//! All work is delegated to [`exemplar_core`]; this crate only parses
//! arguments, asks for confirmation and prints results.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "exemplar",
    about = "Scaffold standalone example projects and their documentation from a shared template",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the registry file (manifest paths are relative to its directory)
    #[arg(
        long,
        global = true,
        env = "EXEMPLAR_REGISTRY",
        default_value = "exemplar.registry.json"
    )]
    registry: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a standalone project for one example
    CreateExample {
        /// Example identifier from the registry
        id: String,

        /// Output directory (default: <outputDir>/<id>)
        out_dir: Option<PathBuf>,

        /// Also generate documentation inside the project
        #[arg(long)]
        with_docs: bool,

        /// Replace an existing output directory without asking
        #[arg(long)]
        force: bool,

        /// Build and test the project after generating it
        #[arg(long)]
        run_tests: bool,
    },

    /// Generate one project containing every contract of a category
    CreateCategory {
        /// Category identifier from the registry
        id: String,

        /// Output directory (default: <categoryOutputDir>/<id>)
        out_dir: Option<PathBuf>,

        /// Replace an existing output directory without asking
        #[arg(long)]
        force: bool,
    },

    /// Generate documentation for one registry entry, or all of them
    GenerateDocs {
        /// Documentation identifier
        #[arg(required_unless_present = "all")]
        id: Option<String>,

        /// Generate every documentation entry
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },

    /// Regenerate every example project and run its tests
    GenerateAllAndTest {
        /// Only generate; do not build or test
        #[arg(long)]
        skip_test: bool,

        /// Restrict the run to examples of one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Set a dependency version across package descriptors
    UpdateDependencies {
        /// Package name, e.g. @fhevm/solidity
        #[arg(long)]
        package: String,

        /// New version, e.g. ^0.9.0
        version: String,

        /// Every scope below, plus generated example projects (the default scope)
        #[arg(long)]
        all: bool,

        /// Generated category projects
        #[arg(long)]
        categories: bool,

        /// The base template
        #[arg(long)]
        base_template: bool,

        /// The descriptor next to the registry
        #[arg(long)]
        main: bool,
    },

    /// List examples, categories and documentation entries
    List {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every file the registry references
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::CreateExample {
            id,
            out_dir,
            with_docs,
            force,
            run_tests,
        } => {
            commands::create_example::run(
                &cli.registry,
                &id,
                out_dir.as_deref(),
                with_docs,
                force,
                run_tests,
            )
            .await?;
        }
        Commands::CreateCategory { id, out_dir, force } => {
            commands::create_category::run(&cli.registry, &id, out_dir.as_deref(), force).await?;
        }
        Commands::GenerateDocs { id, all } => {
            commands::generate_docs::run(&cli.registry, id.as_deref(), all).await?;
        }
        Commands::GenerateAllAndTest {
            skip_test,
            category,
        } => {
            commands::generate_all::run(&cli.registry, skip_test, category.as_deref()).await?;
        }
        Commands::UpdateDependencies {
            package,
            version,
            all,
            categories,
            base_template,
            main,
        } => {
            let scopes = commands::update_deps::scopes(all, categories, base_template, main);
            commands::update_deps::run(&cli.registry, &package, &version, &scopes).await?;
        }
        Commands::List { json } => {
            commands::list::run(&cli.registry, json).await?;
        }
        Commands::Check => {
            commands::check::run(&cli.registry).await?;
        }
    }

    Ok(())
}
