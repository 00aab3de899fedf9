mod browse;
mod cart;
mod group;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cart::CartCommands;

#[derive(Debug, Parser)]
#[command(name = "dema-cli")]
#[command(about = "DEMA catalog toolkit command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Group the extracted catalog files into product groups
    Group {
        /// Directory holding the extracted `<catalog>.json` files
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Directory the grouped files are written to
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// YAML file listing the catalogs to process
        #[arg(long)]
        catalogs: Option<PathBuf>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the filter facets of a grouped catalog
    Facets {
        /// Grouped catalog file (defaults to the combined output)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Active filter as `<dimension>=<value>`; repeatable
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Print the facets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search product groups, or list type-ahead suggestions
    Search {
        /// Free-text query
        query: Option<String>,
        /// Restrict to one catalog (name without `.json`)
        #[arg(long)]
        catalog: Option<String>,
        /// Active filter as `<dimension>=<value>`; repeatable
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Grouped catalog file (defaults to the combined output)
        #[arg(long)]
        file: Option<PathBuf>,
        /// List suggestions instead of matching groups
        #[arg(long)]
        suggest: bool,
        /// Maximum number of groups to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Manage the local quote cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = dema_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Group {
            input_dir,
            output_dir,
            catalogs,
            json,
        }) => group::run_group(&config, input_dir, output_dir, catalogs, json)?,
        Some(Commands::Facets {
            file,
            filters,
            json,
        }) => browse::run_facets(&config, file, &filters, json)?,
        Some(Commands::Search {
            query,
            catalog,
            filters,
            file,
            suggest,
            limit,
        }) => {
            let args = browse::SearchArgs {
                query,
                catalog,
                filters,
                suggest,
                limit,
            };
            browse::run_search(&config, file, args)?;
        }
        Some(Commands::Cart { command }) => cart::run_cart(&config, command)?,
        None => println!("dema-cli: run with --help to list commands"),
    }

    Ok(())
}
