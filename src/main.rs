use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod cart;
mod catalog;
mod cli;
mod command;
mod config;
mod domain;
mod popularity;
mod search;

use cli::{CartCommand, Cli, Commands};
use command::ProductsArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        // No command specified, show help
        eprintln!("No command specified. Use --help for usage information.");
        eprintln!("Use 'antiqkart configure' to connect a catalog backend.");
        return Ok(());
    };

    let data_dir = config::resolve_data_dir(cli.data_dir)?;

    match command {
        Commands::Configure { api_url, api_key } => {
            command::run_configure(&data_dir, api_url, api_key).await
        }
        Commands::Status => command::run_status(&data_dir).await,
        Commands::Reset { yes } => command::run_reset(&data_dir, yes).await,
        Commands::Cart { action } => match action.unwrap_or(CartCommand::List) {
            CartCommand::List => command::run_cart_list(&data_dir, cli.json).await,
            CartCommand::Add { product_id } => command::run_cart_add(&data_dir, &product_id).await,
            CartCommand::Remove { product_id } => {
                command::run_cart_remove(&data_dir, &product_id).await
            }
        },
        Commands::Search { query, remote } => {
            command::run_search(&data_dir, &query.join(" "), remote, cli.json).await
        }
        Commands::Products {
            collection,
            region,
            gi_tagged,
            sort,
            filter,
            limit,
            grouped,
        } => {
            let args = ProductsArgs {
                collection,
                region,
                gi_tagged,
                sort,
                filter,
                limit,
                grouped,
            };
            command::run_products(&data_dir, args, cli.json).await
        }
        Commands::Festivals { slug } => {
            command::run_festivals(&data_dir, slug.as_deref(), cli.json).await
        }
        Commands::Open { path } => command::run_open(&data_dir, &path, cli.json).await,
    }
}
