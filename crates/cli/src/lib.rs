mod build;
mod export;
mod inspect;
mod resolve;
mod view;

use clap::{Args, Parser, Subcommand};
use methodscope_core::{BuildOutcome, EngineConfig, build_graph};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "methodscope",
    version,
    about = "Resolves API call-sites to concrete class methods over a class catalog",
    long_about = "Methodscope builds a knowledge graph of classes, methods, inheritance and \
                  semantic clusters from a class catalog, then resolves ordered call-site \
                  sequences against it with confidence-scored matching tiers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output on stderr (warnings are always shown)
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Args, Clone)]
pub struct ResolveArgs {
    /// Class catalog JSON file
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,

    /// Call-site JSON file: a workflow array or a bare call-site array
    #[arg(value_name = "CALLS")]
    pub calls: PathBuf,

    /// Method name → preferred class names
    #[arg(long, value_name = "FILE")]
    pub priorities: Option<PathBuf>,

    /// Engine configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the knowledge graph and report its statistics
    Build {
        /// Class catalog JSON file
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Engine configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Resolve every call-site of one or more workflows
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,

        /// Write the resolution reports here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Write the reduced catalog the given workflows actually use
    #[command(
        long_about = "Resolves the workflows, then keeps only the classes, methods and \
                      attributes their resolutions consulted. Resolving the same workflows \
                      against the reduced catalog gives the same matches."
    )]
    Filter {
        #[command(flatten)]
        args: ResolveArgs,

        /// Reduced catalog destination
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Show one class or every declarer of one method name
    Inspect {
        /// Class catalog JSON file
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Qualified or short class name
        #[arg(long, conflicts_with = "method", required_unless_present = "method")]
        class: Option<String>,

        /// Bare method name
        #[arg(long)]
        method: Option<String>,

        /// Engine configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Export the graph as a node/link document
    Export {
        /// Class catalog JSON file
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Document destination
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Engine configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = methodscope_core::logging::init_logging("cli", cli.verbose);

    match cli.command {
        Commands::Build { catalog, config } => build::run(&catalog, config.as_deref()),
        Commands::Resolve { args, output } => resolve::run(&args, output.as_deref()),
        Commands::Filter { args, output } => resolve::filter(&args, &output),
        Commands::Inspect {
            catalog,
            class,
            method,
            config,
        } => inspect::run(&catalog, class.as_deref(), method.as_deref(), config.as_deref()),
        Commands::Export {
            catalog,
            output,
            config,
        } => export::run(&catalog, &output, config.as_deref()),
    }
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(EngineConfig::from_path(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Loads the catalog and builds its graph.
pub(crate) fn load_graph(
    catalog: &Path,
    config: &EngineConfig,
) -> Result<BuildOutcome, Box<dyn std::error::Error>> {
    let catalog = methodscope_core::catalog::load_catalog(catalog)?;
    Ok(build_graph(&catalog, &config.build)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_inspect_requires_a_target() {
        assert!(Cli::try_parse_from(["methodscope", "inspect", "catalog.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "methodscope",
                "inspect",
                "catalog.json",
                "--class",
                "Part",
                "--method",
                "update"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["methodscope", "inspect", "catalog.json", "--method", "update"])
                .is_ok()
        );
    }

    #[test]
    fn test_filter_requires_output() {
        assert!(Cli::try_parse_from(["methodscope", "filter", "c.json", "calls.json"]).is_err());
        let cli = Cli::try_parse_from([
            "methodscope",
            "filter",
            "c.json",
            "calls.json",
            "--priorities",
            "p.json",
            "-o",
            "reduced.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Filter { args, output } => {
                assert_eq!(args.priorities, Some(PathBuf::from("p.json")));
                assert_eq!(output, PathBuf::from("reduced.json"));
            }
            _ => panic!("expected filter"),
        }
    }
}
