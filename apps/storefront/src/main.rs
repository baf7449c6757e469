use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use catalog_store::InMemoryCatalog;
use clap::{Parser, Subcommand};
use session_core::{BrowsingState, CatalogEvent, CatalogSessionController, ProductSource};
use shared::domain::{CategoryId, ProductId};
use tracing::info;

mod config;
mod render;
mod telemetry;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Browse the storefront catalog from a terminal")]
struct Cli {
    /// TOML settings file; `storefront.toml` is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print results as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered by category.
    Browse {
        #[arg(long)]
        category: Option<String>,
        /// Number of pages to load, starting at page 1.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Free-text search over product names and descriptions.
    Search { query: String },
    /// List the catalog's categories.
    Categories,
    /// Show a single product.
    Show { product_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    telemetry::init_tracing(&settings.log_filter)?;

    let catalog = Arc::new(open_catalog(&settings)?);

    match cli.command {
        Command::Browse { category, pages } => {
            let session = start_session(&catalog, &settings).await;
            if let Some(category) = category {
                apply(
                    &session,
                    CatalogEvent::CategorySelected(Some(CategoryId::new(category))),
                )
                .await?;
            }
            for _ in 1..pages {
                if !session.snapshot().has_more_pages {
                    break;
                }
                apply(&session, CatalogEvent::LoadMoreProducts).await?;
            }
            finish(session, cli.json)
        }
        Command::Search { query } => {
            let session = start_session(&catalog, &settings).await;
            apply(&session, CatalogEvent::SearchQueryChanged(query)).await?;
            apply(&session, CatalogEvent::Search).await?;
            finish(session, cli.json)
        }
        Command::Categories => {
            let session = start_session(&catalog, &settings).await;
            let state = session.snapshot();
            session.shutdown();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&state.categories)?);
            } else {
                print!("{}", render::render_categories(&state.categories));
            }
            check_error(&state)
        }
        Command::Show { product_id } => {
            let product = catalog
                .fetch_product(&ProductId::new(product_id))
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                println!("{}", render::render_product(&product));
                println!("  {}", product.description);
            }
            Ok(())
        }
    }
}

fn open_catalog(settings: &Settings) -> Result<InMemoryCatalog> {
    let catalog = match &settings.catalog_path {
        Some(path) => InMemoryCatalog::load(path)
            .with_context(|| format!("failed to open catalog '{}'", path.display()))?,
        None => InMemoryCatalog::demo(),
    };
    info!(
        categories = catalog.categories().len(),
        products = catalog.products().len(),
        "catalog ready"
    );
    Ok(catalog.with_latency(settings.source_latency()))
}

async fn start_session(
    catalog: &Arc<InMemoryCatalog>,
    settings: &Settings,
) -> CatalogSessionController {
    let session = CatalogSessionController::spawn(
        catalog.clone(),
        catalog.clone(),
        settings.session(),
    );
    session.wait_idle().await;
    session
}

async fn apply(session: &CatalogSessionController, event: CatalogEvent) -> Result<()> {
    session.dispatch(event)?;
    session.wait_idle().await;
    Ok(())
}

fn finish(session: CatalogSessionController, json: bool) -> Result<()> {
    let state = session.snapshot();
    session.shutdown();
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render::render_state(&state));
    }
    check_error(&state)
}

fn check_error(state: &BrowsingState) -> Result<()> {
    match &state.error {
        Some(error) => bail!("catalog session ended with an error: {error}"),
        None => Ok(()),
    }
}
