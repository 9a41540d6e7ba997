mod ingest;
mod report;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "giftlist-cli")]
#[command(about = "Gift registry catalog and maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the retailer's catalog into the products table.
    Ingest {
        /// Numeric category id to ingest; all known categories when omitted.
        #[arg(long)]
        category: Option<String>,
        /// Override the per-category page cap from configuration.
        #[arg(long)]
        max_pages: Option<u32>,
        /// Fetch and parse a single product page, print the result, and exit
        /// without writing anything. Requires --category for the label.
        #[arg(long)]
        inspect_url: Option<String>,
    },
    /// Apply pending database migrations.
    Migrate,
    /// Print row counts for the catalog and wishlist tables.
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest {
            category,
            max_pages,
            inspect_url,
        } => {
            let config = giftlist_core::load_app_config()?;
            if let Some(url) = inspect_url {
                return ingest::inspect_product_page(&config, &url, category.as_deref()).await;
            }

            let pool = giftlist_db::connect_pool_from_config(&config).await?;
            ingest::run_ingest(&pool, &config, category.as_deref(), max_pages).await
        }
        Commands::Migrate => {
            let config = giftlist_core::load_app_config()?;
            let pool = giftlist_db::connect_pool_from_config(&config).await?;
            let applied = giftlist_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Report => {
            let config = giftlist_core::load_app_config()?;
            let pool = giftlist_db::connect_pool_from_config(&config).await?;
            report::print_report(&pool).await
        }
    }
}
