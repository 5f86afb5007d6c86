//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use unifind_core::{EnrichmentReport, ProgressReporter, ProximityPipeline};
use unifind_places::{ClientOptions, GoogleMapsClient};
use unifind_shared::{
    AppConfig, Property, ProximityConfig, StructuredAddress, init_config, load_config,
    resolve_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// unifind: find the universities nearest a rental property.
#[derive(Parser)]
#[command(
    name = "unifind",
    version,
    about = "Rank the universities and colleges near a property address.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Find the institutions nearest a property.
    Nearest {
        #[command(flatten)]
        address: AddressArgs,

        /// Number of institutions to return (defaults to ranking.limit).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Search radius in meters (defaults to search.radius_m).
        #[arg(long)]
        radius: Option<u32>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where the property address comes from.
#[derive(Args)]
pub(crate) struct AddressArgs {
    /// JSON file holding a listing, e.g. `{"houseAddress": {...}}`.
    #[arg(long, conflicts_with_all = ["line1", "line2", "town", "county", "eircode"])]
    pub property: Option<PathBuf>,

    /// First address line.
    #[arg(long)]
    pub line1: Option<String>,

    /// Second address line.
    #[arg(long)]
    pub line2: Option<String>,

    /// Town or city.
    #[arg(long)]
    pub town: Option<String>,

    /// County.
    #[arg(long)]
    pub county: Option<String>,

    /// Eircode.
    #[arg(long)]
    pub eircode: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "unifind=warn",
        1 => "unifind=info",
        2 => "unifind=debug",
        _ => "unifind=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Nearest {
            address,
            limit,
            radius,
            json,
        } => cmd_nearest(&address, limit, radius, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_nearest(
    args: &AddressArgs,
    limit: Option<usize>,
    radius: Option<u32>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;
    let property = property_from_args(args)?;

    let mut proximity = ProximityConfig::from(&config);
    if let Some(radius) = radius {
        proximity.radius_m = radius;
    }

    let client = GoogleMapsClient::new(ClientOptions::from_config(&config, api_key))?;
    let pipeline = ProximityPipeline::new(client, proximity)?;

    info!(limit = ?limit, "looking up nearest institutions");

    let reporter = CliProgress::new(json);
    let report = pipeline.enrich(&property, limit, &reporter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Build the property from `--property` or the inline address flags.
fn property_from_args(args: &AddressArgs) -> Result<Property> {
    if let Some(path) = &args.property {
        return read_property(path);
    }

    let line1 = args
        .line1
        .clone()
        .ok_or_else(|| eyre!("either --property or --line1 is required"))?;

    Ok(Property {
        house_address: Some(StructuredAddress {
            address_line1: line1,
            address_line2: args.line2.clone(),
            town_city: args.town.clone().unwrap_or_default(),
            county: args.county.clone().unwrap_or_default(),
            eircode: args.eircode.clone().unwrap_or_default(),
        }),
    })
}

fn read_property(path: &Path) -> Result<Property> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read property file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("'{}' is not a valid property JSON document", path.display()))
}

fn print_report(report: &EnrichmentReport) {
    println!();
    match (&report.query, &report.origin) {
        (None, _) => {
            println!("  Property has no address; nothing to look up.");
            println!();
            return;
        }
        (Some(query), None) => {
            println!("  Could not geocode: {query}");
            println!();
            return;
        }
        (Some(query), Some(origin)) => {
            println!("  Address: {query}");
            println!("  Located: {origin}");
        }
    }

    if report.institutions.is_empty() {
        println!("  No institutions found nearby.");
        println!();
        return;
    }

    if report.failed_batches > 0 {
        println!(
            "  Warning: {} distance lookup(s) failed; affected distances show as 0 km.",
            report.failed_batches
        );
    }
    println!();

    for (rank, institution) in report.institutions.iter().enumerate() {
        let rating = institution
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".into());
        let reviews = institution
            .total_reviews
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".into());
        println!("  {}. {}", rank + 1, institution.name);
        println!("     {}", institution.address.address_line1);
        println!(
            "     {:.1} km · ~{} min by car · rating {rating} ({reviews} reviews)",
            institution.distance as f64 / 1000.0,
            institution.avg_time_by_car
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Hidden when stdout carries JSON.
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &EnrichmentReport) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
