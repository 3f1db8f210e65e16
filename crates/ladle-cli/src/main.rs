//! Ladle CLI for publishing recipes from the command line.
//!
//! Set DATABASE_URL; see `PublisherConfig` for the storage variables.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use ladle_cli::{format_slot_list, init_tracing};
use ladle_core::{Attachment, Draft, PublisherConfig, RecipeId, TaxonomySelection};
use ladle_db::{connect_pool, run_migrations, CatalogRepository, RecipeRepository, RecipeStore};
use ladle_pipeline::{CommitCoordinator, SubmissionResult, TaxonomyGate};
use ladle_storage::create_object_store;

#[derive(Parser)]
#[command(name = "ladle", about = "Recipe publishing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a recipe with optional attached images
    Publish(PublishArgs),
    /// Show a published recipe and its image URLs
    Show {
        /// Recipe UUID
        id: Uuid,
    },
    /// List the available categories
    Categories,
    /// List the available occasions
    Occasions,
}

#[derive(Args)]
struct PublishArgs {
    /// Recipe owner UUID
    #[arg(long)]
    owner: Uuid,
    /// Recipe title
    #[arg(long)]
    title: String,
    /// Short overview text
    #[arg(long)]
    overview: String,
    /// Preparation time in minutes
    #[arg(long)]
    prep_minutes: u64,
    /// Cooking time in minutes
    #[arg(long)]
    cook_minutes: u64,
    /// Ingredient list
    #[arg(long)]
    ingredients: String,
    /// Preparation instructions
    #[arg(long)]
    instructions: String,
    /// Optional free-form note
    #[arg(long)]
    note: Option<String>,
    /// Image file to attach (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
    /// Category id (see `ladle categories`)
    #[arg(long)]
    category: i32,
    /// Occasion id (see `ladle occasions`)
    #[arg(long)]
    occasion: i32,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = PublisherConfig::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Publish(args) => publish(&config, args).await,
        Commands::Show { id } => show(&config, RecipeId::from(id)).await,
        Commands::Categories => {
            let pool = connect_pool(&config).await?;
            run_migrations(&pool).await?;
            let catalog = CatalogRepository::new(pool);
            print_json(&catalog.list_categories().await?)
        }
        Commands::Occasions => {
            let pool = connect_pool(&config).await?;
            run_migrations(&pool).await?;
            let catalog = CatalogRepository::new(pool);
            print_json(&catalog.list_occasions().await?)
        }
    }
}

async fn show(config: &PublisherConfig, recipe_id: RecipeId) -> Result<()> {
    let pool = connect_pool(config).await?;
    run_migrations(&pool).await?;
    let repository = RecipeRepository::new(pool);

    let Some(recipe) = repository.get_recipe(recipe_id).await? else {
        bail!("no recipe with id {recipe_id}");
    };

    let images = repository.list_asset_urls(recipe_id).await?;
    print_json(&serde_json::json!({ "recipe": recipe, "images": images }))
}

async fn publish(config: &PublisherConfig, args: PublishArgs) -> Result<()> {
    let pool = connect_pool(config).await?;
    run_migrations(&pool).await?;

    // The catalogs are choice surfaces; resolve the ids up front so the
    // pipeline only ever sees a valid selection.
    let catalog = CatalogRepository::new(pool.clone());
    let categories = catalog.list_categories().await?;
    if !categories.iter().any(|c| c.id == args.category) {
        bail!(
            "unknown category id {} (see `ladle categories`)",
            args.category
        );
    }
    let occasions = catalog.list_occasions().await?;
    if !occasions.iter().any(|o| o.id == args.occasion) {
        bail!(
            "unknown occasion id {} (see `ladle occasions`)",
            args.occasion
        );
    }

    let objects = create_object_store(config).await?;
    let repository = RecipeRepository::new(pool);
    let recipes = Arc::new(repository.clone()) as Arc<dyn RecipeStore>;

    let mut attachments = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        attachments.push(Some(Attachment::new(bytes, filename)));
    }

    let draft = Draft {
        owner_id: args.owner,
        title: args.title,
        overview: args.overview,
        prep_time: Duration::from_secs(args.prep_minutes.saturating_mul(60)),
        cook_time: Duration::from_secs(args.cook_minutes.saturating_mul(60)),
        ingredients: args.ingredients,
        instructions: args.instructions,
        note: args.note,
        attachments,
    };

    let coordinator = CommitCoordinator::new(
        objects,
        recipes,
        config.upload_timeout,
        config.insert_timeout,
    );

    // The ids were validated above, so the selection resolves immediately.
    let gate = TaxonomyGate::new();
    let permit = gate.open()?;
    gate.resolve(TaxonomySelection {
        category_id: args.category,
        occasion_id: args.occasion,
    });

    match coordinator.publish(draft, permit).await {
        SubmissionResult::Success { recipe_id } => {
            let images = repository.list_asset_urls(recipe_id).await?;
            print_json(&serde_json::json!({ "recipe_id": recipe_id, "images": images }))
        }
        SubmissionResult::PartialFailure {
            recipe_id,
            failed_slots,
        } => {
            let images = repository.list_asset_urls(recipe_id).await?;
            print_json(&serde_json::json!({
                "recipe_id": recipe_id,
                "images": images,
                "failed_slots": failed_slots,
                "warning": format!(
                    "image slot(s) {} failed to attach; the recipe is live without them",
                    format_slot_list(&failed_slots)
                ),
            }))
        }
        SubmissionResult::Failure { error } => {
            Err(anyhow::Error::new(error).context("Submission failed; nothing was published"))
        }
    }
}
