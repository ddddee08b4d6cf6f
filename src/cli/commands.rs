use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use stall_registry::error::{Result, StallError};
use stall_registry::image::{self, is_data_uri};
use stall_registry::{
    NewReview, NewStall, RegistryConfig, Stall, StallFilter, StallRegistry, StallSort,
    CURRENT_USER,
};

#[derive(Parser)]
#[command(name = "stall-registry")]
#[command(about = "Browse, add and review informal food stalls")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Create the database and the example stalls
    stall-registry init

    # Best rated stalls in one neighbourhood
    stall-registry list --location Chinatown

    # Add a stall with a photo from disk
    stall-registry add-stall --name "Bao Bus" --location Chinatown \
        --description "Steamed buns" --dish "Pork belly bao" --price 6.5 --image bao.jpg

    # Review it
    stall-registry review <STALL_ID> --rating 5 --comment "Pillowy"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the registry database (overrides config and environment)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the collections and seed example stalls if empty
    Init,

    /// List stalls
    List {
        /// Only stalls at this exact location
        #[arg(long)]
        location: Option<String>,

        /// Sort order: rating or name
        #[arg(long, default_value = "rating")]
        sort: String,
    },

    /// Show a stall and its reviews
    Show {
        /// Stall id
        id: String,
    },

    /// Add a new stall
    AddStall {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        #[arg(long)]
        description: String,

        /// Must-try dish
        #[arg(long)]
        dish: String,

        /// Approximate price per person
        #[arg(long)]
        price: f64,

        /// Image file to embed, or an http(s) URL
        #[arg(long)]
        image: String,
    },

    /// Review a stall as the current user
    Review {
        /// Stall id
        stall_id: String,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,

        #[arg(long)]
        comment: String,

        /// Optional image file to embed
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List the current user's reviews
    MyReviews,

    /// List distinct stall locations
    Locations,

    /// Show collection statistics
    Stats,

    /// Delete all stalls and reviews
    Reset,
}

/// Config file and environment first, then `--db` on top.
pub fn resolve_config(cli: &Cli) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    Ok(config)
}

/// Opens the registry and makes sure both collections exist.
fn open(config: &RegistryConfig) -> Result<StallRegistry> {
    let registry = StallRegistry::from_config(config)?;
    registry.initialize()?;
    Ok(registry)
}

pub fn init(config: &RegistryConfig) -> Result<()> {
    let registry = StallRegistry::from_config(config)?;
    let report = registry.initialize()?;

    println!("Registry: {}", config.database.display());
    if report.created.is_empty() {
        println!("  Collections already present");
    } else {
        println!("  Created collections: {}", report.created.join(", "));
    }
    if report.seeded > 0 {
        println!("  Seeded {} example stalls", report.seeded);
    }

    Ok(())
}

pub fn list(config: &RegistryConfig, location: Option<String>, sort: &str) -> Result<()> {
    let registry = open(config)?;
    let filter = StallFilter {
        location,
        sort: sort.parse::<StallSort>()?,
    };

    let stalls = registry.list_stalls(&filter)?;
    if stalls.is_empty() {
        println!("No food stalls found");
        return Ok(());
    }

    for stall in &stalls {
        print_stall_line(stall);
    }

    Ok(())
}

pub fn show(config: &RegistryConfig, id: &str) -> Result<()> {
    let registry = open(config)?;
    let stall = registry
        .stall_by_id(id)?
        .ok_or_else(|| StallError::NotFound(format!("stall {}", id)))?;

    println!("{}", stall.name);
    println!("  Location: {}", stall.location);
    println!("  Rating: {}", stall.rating_label());
    println!("  Must try: {}", stall.must_try_dish);
    println!("  Price: ~${:.2}", stall.approximate_price);
    println!("  Image: {}", describe_image(&stall.image_url));
    println!("\n  {}", stall.description);

    let reviews = registry.reviews_by_stall_id(id)?;
    println!("\nReviews ({}):", reviews.len());
    if reviews.is_empty() {
        println!("  No reviews yet. Be the first to review!");
    }
    for review in reviews {
        println!(
            "  {} {} on {}",
            review.stars(),
            review.user_name,
            review.created_at.format("%Y-%m-%d")
        );
        println!("    {}", review.comment);
        if let Some(image_url) = &review.image_url {
            println!("    Image: {}", describe_image(image_url));
        }
    }

    Ok(())
}

pub async fn add_stall(
    config: &RegistryConfig,
    name: String,
    location: String,
    description: String,
    dish: String,
    price: f64,
    image: &str,
) -> Result<()> {
    let registry = open(config)?;

    let draft = NewStall::new(name, location, description, dish, price, image).trimmed();
    draft.validate()?;
    if registry.is_name_taken(&draft.name)? {
        return Err(StallError::validation(format!(
            "a stall named '{}' already exists",
            draft.name
        )));
    }

    let image_url = if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else {
        image::ingest(Path::new(image), config.max_image_bytes).await?
    };

    let stall = registry.add_stall(NewStall { image_url, ..draft })?;
    println!("Added stall {} ({})", stall.name, stall.id);
    Ok(())
}

pub async fn add_review(
    config: &RegistryConfig,
    stall_id: &str,
    rating: u8,
    comment: String,
    image: Option<&Path>,
) -> Result<()> {
    let registry = open(config)?;
    if registry.stall_by_id(stall_id)?.is_none() {
        return Err(StallError::NotFound(format!("stall {}", stall_id)));
    }

    let mut draft = NewReview::new(stall_id, &CURRENT_USER, rating, comment.trim());
    draft.validate()?;

    if let Some(path) = image {
        draft = draft.with_image(image::ingest(path, config.max_image_bytes).await?);
    }

    let review = registry.add_review(draft)?;
    let rating = registry
        .stall_by_id(stall_id)?
        .map(|s| s.rating_label())
        .unwrap_or_else(|| "New".to_string());
    println!("Added review {} (stall rating now {})", review.id, rating);
    Ok(())
}

pub fn my_reviews(config: &RegistryConfig) -> Result<()> {
    let registry = open(config)?;
    let entries = registry.reviews_with_stalls(&CURRENT_USER.id)?;

    if entries.is_empty() {
        println!("You haven't written any reviews yet");
        return Ok(());
    }

    for entry in entries {
        let stall_name = entry
            .stall
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("(stall removed)");
        println!("{} {}", entry.review.stars(), stall_name);
        println!("    {}", entry.review.comment);
    }

    Ok(())
}

pub fn locations(config: &RegistryConfig) -> Result<()> {
    let registry = open(config)?;
    for location in registry.locations()? {
        println!("{}", location);
    }
    Ok(())
}

pub fn show_stats(config: &RegistryConfig) -> Result<()> {
    let registry = open(config)?;
    let stats = registry.stats()?;

    println!("Registry Statistics:");
    println!("  Stalls: {}", stats.stalls);
    println!("  Rated stalls: {}", stats.rated_stalls);
    println!("  Reviews: {}", stats.reviews);
    println!("  Locations: {}", stats.locations);

    Ok(())
}

pub fn reset(config: &RegistryConfig) -> Result<()> {
    let registry = StallRegistry::from_config(config)?;
    registry.clear()?;
    println!("Registry cleared: {}", config.database.display());
    Ok(())
}

fn print_stall_line(stall: &Stall) {
    println!(
        "{} [{}] - {} - ~${:.2} - {}",
        stall.name,
        stall.rating_label(),
        stall.location,
        stall.approximate_price,
        stall.id
    );
}

fn describe_image(image_url: &str) -> String {
    if is_data_uri(image_url) {
        let mime = image_url
            .trim_start_matches("data:")
            .split(';')
            .next()
            .unwrap_or("unknown");
        format!("embedded {} ({} chars)", mime, image_url.len())
    } else {
        image_url.to_string()
    }
}
