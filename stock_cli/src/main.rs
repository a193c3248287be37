use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stock_core::*;

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Warehouse stock tracking and stockout forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stockout forecast for every product (default)
    Forecast,

    /// List products with their current stock
    Products {
        /// Only products whose name starts with this (case-insensitive)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Add a product to the catalog
    AddProduct {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        /// Desired minimum stock
        #[arg(long, default_value_t = 0)]
        min: i64,

        /// Desired maximum stock
        #[arg(long)]
        max: i64,
    },

    /// Show a product's movement history, newest first
    Movements {
        product_id: i64,
    },

    /// Record a movement now: positive restocks, negative consumes
    Record {
        product_id: i64,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Roll up journal movements to the CSV archive
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Warnings only, so stdout stays a clean report
    stock_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let mut repo = FileRepository::new(data_dir);

    match cli.command.unwrap_or(Commands::Forecast) {
        Commands::Forecast => cmd_forecast(&repo, &config),
        Commands::Products { prefix } => cmd_products(&repo, prefix),
        Commands::AddProduct { id, name, min, max } => cmd_add_product(&repo, id, &name, min, max),
        Commands::Movements { product_id } => cmd_movements(&repo, product_id),
        Commands::Record {
            product_id,
            quantity,
        } => cmd_record(&mut repo, product_id, quantity),
        Commands::Rollup { cleanup } => cmd_rollup(&repo, cleanup),
    }
}

fn cmd_forecast(repo: &FileRepository, config: &Config) -> Result<()> {
    let products = repo.list_products()?;
    let errors = stock_core::catalog::validate(&products);
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    if products.is_empty() {
        println!("No products in catalog.");
        return Ok(());
    }

    let rows = build_forecast(repo, chrono::Utc::now(), config.report.unprojected)?;
    display_forecast(&rows, &config.report);
    Ok(())
}

fn cmd_products(repo: &FileRepository, prefix: Option<String>) -> Result<()> {
    let mut products = match prefix {
        Some(ref prefix) => repo.list_products_by_prefix(prefix)?,
        None => repo.list_products()?,
    };

    if products.is_empty() {
        println!("No matching products.");
        return Ok(());
    }

    for product in products.iter_mut() {
        repo.load_movements_into(product)?;
        println!(
            "  {:>5}  {}  [min {}, max {}]",
            product.id(),
            product,
            product.stock_min(),
            product.stock_max()
        );
    }
    Ok(())
}

fn cmd_add_product(repo: &FileRepository, id: i64, name: &str, min: i64, max: i64) -> Result<()> {
    let candidate = Product::new(id, name, min, max);
    let errors = stock_core::catalog::validate(std::slice::from_ref(&candidate));
    if !errors.is_empty() {
        return Err(Error::CatalogValidation(errors.join("; ")));
    }

    stock_core::catalog::append_product(&repo.catalog_path(), id, name, min, max)?;
    println!("✓ Added product {} ({})", id, name);
    Ok(())
}

fn cmd_movements(repo: &FileRepository, product_id: i64) -> Result<()> {
    let mut product = repo.find_product(product_id)?;
    repo.load_movements_into(&mut product)?;

    println!("{}", product);
    if product.movements().is_empty() {
        println!("  No movements recorded.");
    }
    for movement in product.movements() {
        println!("  {}", movement);
    }
    Ok(())
}

fn cmd_record(repo: &mut FileRepository, product_id: i64, quantity: i64) -> Result<()> {
    let mut product = repo.find_product(product_id)?;
    repo.load_movements_into(&mut product)?;

    if !repo.record_movement(&mut product, quantity)? {
        println!("✗ Movement not recorded");
        std::process::exit(1);
    }

    println!("✓ Movement recorded");
    println!("  {}", product);
    Ok(())
}

fn cmd_rollup(repo: &FileRepository, cleanup: bool) -> Result<()> {
    let journal_path = repo.journal_path();
    let archive_path = repo.archive_path();

    if journal_path.exists() {
        let count =
            stock_core::archive::journal_to_csv_and_archive(&journal_path, &archive_path)?;
        println!("✓ Rolled up {} movements to CSV", count);
        println!("  CSV: {}", archive_path.display());
    } else {
        println!("No journal found - nothing to roll up.");
    }

    // Leftovers from earlier rollups go too
    if cleanup {
        let cleaned = stock_core::archive::cleanup_processed_journals(&repo.journal_dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}

fn display_forecast(rows: &[ForecastRow], report: &stock_core::config::ReportConfig) {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Product".len());

    println!(
        "{:<name_width$}  {:>10}  {:>14}  {}",
        "Product", "Quantity", "Avg. per day", "Stockout date"
    );
    for row in rows {
        println!(
            "{:<name_width$}  {:>10}  {:>14}  {}",
            row.name,
            row.stock,
            row.rate_display(report.rate_decimals),
            row.stockout_display(&report.date_format)
        );
    }
}
