//! Linkdir
//!
//! A categorized link directory: a reactive data-access layer over a live
//! SQLite-backed document store, plus a view controller mapping user
//! actions onto it. This binary is the demo/bootstrap runner: it seeds an
//! empty directory and prints the current listings.

mod config;
mod controller;
mod data;
mod errors;
mod models;
mod store;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use controller::ViewController;
use data::DataLayer;
use store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Linkdir");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Admin email: {}", config.admin_email);

    // Initialize store and data layer
    let pool = store::init_database(&config.db_path).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let data = Arc::new(DataLayer::connect(store, Arc::new(config)).await?);

    // Seed demo content into an empty directory
    if data.categories().is_empty() && data.listings().is_empty() {
        tracing::info!("Directory is empty, seeding demo content");
        data.seed_defaults().await?;

        let mut listings = data.watch_listings();
        while listings.borrow_and_update().is_empty() {
            listings.changed().await?;
        }
    }

    // Print the directory, newest first
    let controller = ViewController::new(data.clone());
    let categories = data.categories();
    println!("{} categories, {} listings", categories.len(), data.listings().len());
    for listing in controller.filtered_listings() {
        let category = categories
            .iter()
            .find(|c| c.id == listing.category)
            .map(|c| c.name.as_str())
            .unwrap_or("uncategorized");
        println!(
            "[{}] {} <{}> by {} ({} views)",
            category, listing.title, listing.url, listing.author_name, listing.views
        );
    }

    Ok(())
}
