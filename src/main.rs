mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

use stall_registry::RegistryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::resolve_config(&cli)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    run(cli.command, &config).await?;
    Ok(())
}

async fn run(command: Commands, config: &RegistryConfig) -> stall_registry::Result<()> {
    match command {
        Commands::Init => cli::init(config)?,
        Commands::List { location, sort } => cli::list(config, location, &sort)?,
        Commands::Show { id } => cli::show(config, &id)?,
        Commands::AddStall {
            name,
            location,
            description,
            dish,
            price,
            image,
        } => {
            cli::add_stall(config, name, location, description, dish, price, &image).await?;
        }
        Commands::Review {
            stall_id,
            rating,
            comment,
            image,
        } => {
            cli::add_review(config, &stall_id, rating, comment, image.as_deref()).await?;
        }
        Commands::MyReviews => cli::my_reviews(config)?,
        Commands::Locations => cli::locations(config)?,
        Commands::Stats => cli::show_stats(config)?,
        Commands::Reset => cli::reset(config)?,
    }
    Ok(())
}
