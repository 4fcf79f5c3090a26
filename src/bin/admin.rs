//! CLI administration tool for recipe-share.
//!
//! Loads reference data, manages staff rights, and performs database checks
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Load ingredients from a JSON file
//! cargo run --bin admin -- ingredients import data/ingredients.json
//!
//! # Create and list tags
//! cargo run --bin admin -- tags create --name Breakfast --slug breakfast
//! cargo run --bin admin -- tags list
//!
//! # Grant staff rights
//! cargo run --bin admin -- users promote cook@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use recipe_share::domain::entities::{NewIngredient, NewTag};
use recipe_share::domain::repositories::{CatalogRepository, UserRepository};
use recipe_share::infrastructure::persistence::{PgCatalogRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use serde::Deserialize;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI tool for managing recipe-share.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage ingredients
    Ingredients {
        #[command(subcommand)]
        action: IngredientAction,
    },

    /// Manage tags
    Tags {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum IngredientAction {
    /// Import ingredients from a JSON array of `{name, measurement_unit}`
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Create a tag
    Create {
        /// Display name (e.g. "Breakfast")
        #[arg(short, long)]
        name: Option<String>,

        /// Unique slug used in filters (e.g. "breakfast")
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List all tags
    List,
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant staff rights
    Promote {
        /// Account email
        email: String,

        /// Remove staff rights instead
        #[arg(long)]
        revoke: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

/// One entry of the ingredients import file.
#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Ingredients { action } => handle_ingredient_action(action, &pool).await?,
        Commands::Tags { action } => handle_tag_action(action, &pool).await?,
        Commands::Users { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_ingredient_action(action: IngredientAction, pool: &PgPool) -> Result<()> {
    let repo = PgCatalogRepository::new(Arc::new(pool.clone()));

    match action {
        IngredientAction::Import { file, yes } => import_ingredients(&repo, file, yes).await,
    }
}

/// Imports ingredients, skipping `(name, measurement_unit)` pairs that exist.
async fn import_ingredients(repo: &PgCatalogRepository, file: PathBuf, yes: bool) -> Result<()> {
    println!("{}", "Import ingredients".bright_blue().bold());
    println!();

    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<IngredientRecord> =
        serde_json::from_str(&raw).context("Expected a JSON array of {name, measurement_unit}")?;

    let items: Vec<NewIngredient> = records
        .into_iter()
        .map(|r| NewIngredient {
            name: r.name.trim().to_string(),
            measurement_unit: r.measurement_unit.trim().to_string(),
        })
        .filter(|i| !i.name.is_empty() && !i.measurement_unit.is_empty())
        .collect();

    println!("  File:    {}", file.display().to_string().cyan());
    println!("  Records: {}", items.len().to_string().bright_white().bold());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Import these ingredients?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let total = items.len();
    let inserted = repo
        .import_ingredients(items)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to import ingredients: {}", e))?;

    println!(
        "{} {} new, {} already present",
        "Imported:".green().bold(),
        inserted.to_string().bright_green().bold(),
        (total as u64).saturating_sub(inserted).to_string().bright_black()
    );

    Ok(())
}

async fn handle_tag_action(action: TagAction, pool: &PgPool) -> Result<()> {
    let repo = PgCatalogRepository::new(Arc::new(pool.clone()));

    match action {
        TagAction::Create { name, slug } => create_tag(&repo, name, slug).await,
        TagAction::List => list_tags(&repo).await,
    }
}

/// Creates a tag, prompting for missing fields.
async fn create_tag(
    repo: &PgCatalogRepository,
    name: Option<String>,
    slug: Option<String>,
) -> Result<()> {
    println!("{}", "Create tag".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Tag name").interact_text()?,
    };
    let slug = match slug {
        Some(s) => s,
        None => Input::new()
            .with_prompt("Slug")
            .with_initial_text(name.to_lowercase().replace(' ', "-"))
            .interact_text()?,
    };

    let tag = repo
        .create_tag(NewTag { name, slug })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create tag: {}", e))?;

    println!(
        "{} {} ({}) with id {}",
        "Created tag".green().bold(),
        tag.name.cyan(),
        tag.slug.bright_white(),
        tag.id.to_string().bright_black()
    );

    Ok(())
}

/// Lists all tags.
///
/// # Output Format
///
/// ```text
/// Tags
///
///   ID  Name                 Slug
///   ----------------------------------------------
///   1   Breakfast            breakfast
/// ```
async fn list_tags(repo: &PgCatalogRepository) -> Result<()> {
    println!("{}", "Tags".bright_blue().bold());
    println!();

    let tags = repo
        .list_tags()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tags: {}", e))?;

    if tags.is_empty() {
        println!("{}", "  No tags found".yellow());
        println!();
        println!(
            "  Create one with: {} admin tags create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<20} {:<20}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Slug".bright_white().bold()
    );
    println!("  {}", "-".repeat(46).bright_black());

    for tag in &tags {
        println!(
            "  {:<3} {:<20} {:<20}",
            tag.id.to_string().bright_black(),
            tag.name.cyan(),
            tag.slug
        );
    }

    println!();
    println!("  Total: {}", tags.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Promote { email, revoke } => promote_user(&repo, &email, !revoke).await,
    }
}

/// Grants or removes staff rights after confirmation.
async fn promote_user(repo: &PgUserRepository, email: &str, is_staff: bool) -> Result<()> {
    let user = repo
        .find_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    if user.is_staff == is_staff {
        println!(
            "{}",
            format!("{} already has this role", user.username).yellow()
        );
        return Ok(());
    }

    let prompt = if is_staff {
        format!("Grant staff rights to {} <{}>?", user.username, user.email)
    } else {
        format!("Remove staff rights from {} <{}>?", user.username, user.email)
    };

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.set_staff(email, is_staff)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update user: {}", e))?;

    println!("{}", "User updated".green().bold());
    Ok(())
}

/// Displays system statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    for (label, table) in [
        ("Users", "users"),
        ("Recipes", "recipes"),
        ("Ingredients", "ingredients"),
        ("Tags", "tags"),
        ("Short links", "short_links"),
    ] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;

        println!(
            "  {:<13} {}",
            format!("{label}:"),
            count.to_string().bright_green().bold()
        );
    }

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM auth_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;
    println!(
        "  {:<13} {}",
        "Active tokens:",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
