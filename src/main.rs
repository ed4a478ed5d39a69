use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use supersaver::bill::receipt::is_receipt_file_name;
use supersaver::config::{config_dir, expand_path, init_config_dir, load_config, CatalogSettings};
use supersaver::logging::init_logging;
use supersaver::report::{generate_revenue_report, DateRange};
use supersaver::{load_catalog, Catalog, Config, Controller, PosSession, Result};

#[derive(Parser)]
#[command(name = "pos")]
#[command(version, about = "SuperSaver point-of-sale terminal", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.supersaver or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Item catalog CSV (overrides catalog.path from config.toml)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory for receipts and revenue reports (overrides store.output_dir)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive billing menu (default)
    Run,

    /// Initialize config directory with a template config and sample catalog
    Init,

    /// List catalog items
    Items,

    /// Generate a revenue report from finalized receipts
    Report {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },

    /// Show configuration, catalog and receipt summary
    Status,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Effective file locations after applying CLI overrides to the config
struct Paths {
    config_dir: PathBuf,
    catalog: PathBuf,
    output_dir: PathBuf,
}

impl Paths {
    fn resolve(cli: &Cli, cfg_dir: PathBuf, config: &Config) -> Self {
        Self {
            catalog: cli
                .catalog
                .clone()
                .unwrap_or_else(|| expand_path(&config.catalog.path)),
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| expand_path(&config.store.output_dir)),
            config_dir: cfg_dir,
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match &cli.config_dir {
        Some(p) => p.clone(),
        None => config_dir()?,
    };

    let config = load_config(&cfg_dir)?;
    let paths = Paths::resolve(&cli, cfg_dir, &config);

    match cli.command {
        None | Some(Commands::Run) => cmd_run(&paths, &config.catalog),
        Some(Commands::Init) => cmd_init(&paths.config_dir),
        Some(Commands::Items) => cmd_items(&paths, &config.catalog),
        Some(Commands::Report { ref from, ref to }) => cmd_report(&paths, from, to),
        Some(Commands::Status) => cmd_status(&paths, &config.catalog),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized POS config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Review settings:        $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Replace sample items:   $EDITOR {}/items.csv",
        cfg_dir.display()
    );
    println!();
    println!("Then start billing:");
    println!(
        "  pos -C {} --catalog {}/items.csv",
        cfg_dir.display(),
        cfg_dir.display()
    );

    Ok(())
}

/// Load the catalog for interactive use. A missing or unreadable file
/// leaves the catalog empty so the terminal still starts.
fn open_catalog(path: &Path, settings: &CatalogSettings) -> Catalog {
    match load_catalog(path, settings) {
        Ok(load) => {
            report_rejected(path, &load.rejected);
            load.catalog
        }
        Err(e) => {
            tracing::error!(error = %e, "catalog unavailable");
            println!("{e}");
            println!("Continuing with an empty catalog; every item lookup will fail.");
            Catalog::default()
        }
    }
}

fn report_rejected(path: &Path, rejected: &[supersaver::catalog::RejectedRow]) {
    if rejected.is_empty() {
        return;
    }
    println!(
        "Skipped {} malformed row(s) in {}:",
        rejected.len(),
        path.display()
    );
    for row in rejected {
        println!("  line {}: {}", row.line, row.reason);
    }
}

/// Run the interactive menu on stdin/stdout
fn cmd_run(paths: &Paths, settings: &CatalogSettings) -> Result<()> {
    let catalog = open_catalog(&paths.catalog, settings);
    println!("Loaded {} item(s) from {}", catalog.len(), paths.catalog.display());

    fs::create_dir_all(&paths.output_dir)?;

    let stdin = std::io::stdin();
    let mut controller = Controller::new(
        PosSession::new(catalog),
        paths.output_dir.clone(),
        stdin.lock(),
        std::io::stdout(),
    );
    controller.run()
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "DISCOUNT")]
    discount: String,
    #[tabled(rename = "NET")]
    net: String,
    #[tabled(rename = "SIZE")]
    size: String,
    #[tabled(rename = "EXPIRY")]
    expiry: String,
    #[tabled(rename = "MANUFACTURER")]
    manufacturer: String,
}

/// List catalog items
fn cmd_items(paths: &Paths, settings: &CatalogSettings) -> Result<()> {
    let load = load_catalog(&paths.catalog, settings)?;
    report_rejected(&paths.catalog, &load.rejected);

    if load.catalog.is_empty() {
        println!("No items in catalog.");
        println!("Add items to: {}", paths.catalog.display());
        return Ok(());
    }

    let rows: Vec<ItemRow> = load
        .catalog
        .sorted()
        .into_iter()
        .map(|item| ItemRow {
            code: item.code.clone(),
            name: item.name.clone(),
            price: format!("Rs.{:.2}", item.price),
            discount: format!("{}%", item.discount),
            net: format!("Rs.{:.2}", item.discounted_price()),
            size: item.size.clone(),
            expiry: item.expiry_date.clone(),
            manufacturer: item.manufacturer.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Generate a revenue report without entering the menu
fn cmd_report(paths: &Paths, from: &str, to: &str) -> Result<()> {
    let range = DateRange::parse(from, to)?;
    let (summary, path) = generate_revenue_report(&paths.output_dir, &range)?;

    for skipped in &summary.skipped {
        println!(
            "Error reading bill file {}: {}",
            skipped.path.display(),
            skipped.error
        );
    }

    println!("Revenue report for {} to {}", range.start(), range.end());
    println!("  Receipts: {}", summary.included.len());
    println!("  Skipped:  {}", summary.skipped.len());
    println!("  Total:    Rs.{:.2}", summary.total);
    println!("  Saved:    {}", path.display());

    Ok(())
}

/// Show where things live and how much is there
fn cmd_status(paths: &Paths, settings: &CatalogSettings) -> Result<()> {
    println!("POS Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", paths.config_dir.display());

    match load_catalog(&paths.catalog, settings) {
        Ok(load) => println!(
            "Catalog:          {} ({} items, {} rejected)",
            paths.catalog.display(),
            load.catalog.len(),
            load.rejected.len()
        ),
        Err(_) => println!("Catalog:          {} (unavailable)", paths.catalog.display()),
    }
    println!(
        "Discount policy:  {:?} (max {}%)",
        settings.discount_policy, settings.max_discount
    );
    println!("Output directory: {}", paths.output_dir.display());

    let receipts = match fs::read_dir(&paths.output_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(is_receipt_file_name)
                    .unwrap_or(false)
            })
            .count(),
        Err(_) => 0,
    };
    println!("Receipts:         {}", receipts);

    Ok(())
}
