use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use storage_hierarchy_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    events::{process_events, EventSender},
    services::{
        gps_resolver::{GpsResolver, Resolution},
        hierarchy::{HierarchyService, Utilization, WarehouseTree},
        hierarchy_validator::{HierarchySelection, HierarchyValidation, HierarchyValidator},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied to {}", context.config.database_url);
        }
        Commands::Resolve(args) => handle_resolve(&context, args, cli.json).await?,
        Commands::Validate(args) => handle_validate(&context, args, cli.json).await?,
        Commands::Hierarchy(args) => handle_hierarchy(&context, args, cli.json).await?,
        Commands::Utilization(args) => handle_utilization(&context, args, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "storage-cli",
    about = "Storage hierarchy maintenance and lookups",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Resolve a GPS point to warehouse, area and location
    Resolve(ResolveArgs),
    /// Audit a selection of hierarchy ids for consistency
    Validate(ValidateArgs),
    /// Dump a warehouse with its areas, locations and bins
    Hierarchy(HierarchyArgs),
    /// Area or warehouse utilization
    Utilization(UtilizationArgs),
}

#[derive(Args)]
struct ResolveArgs {
    #[arg(long, allow_negative_numbers = true, help = "WGS84 longitude")]
    longitude: f64,
    #[arg(long, allow_negative_numbers = true, help = "WGS84 latitude")]
    latitude: f64,
}

#[derive(Args)]
struct ValidateArgs {
    #[arg(long)]
    warehouse_id: Option<i32>,
    #[arg(long)]
    storage_area_id: Option<i32>,
    #[arg(long)]
    storage_location_id: Option<i32>,
    #[arg(long)]
    storage_bin_id: Option<i32>,
}

#[derive(Args)]
struct HierarchyArgs {
    /// Warehouse id
    warehouse_id: i32,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct UtilizationArgs {
    #[arg(long)]
    storage_area_id: Option<i32>,
    #[arg(long)]
    warehouse_id: Option<i32>,
}

async fn handle_resolve(context: &CliContext, args: ResolveArgs, json: bool) -> Result<()> {
    let resolution = GpsResolver::new(context.db.clone())
        .resolve(args.longitude, args.latitude)
        .await
        .context("failed to resolve point")?;

    if json {
        return print_json(&resolution);
    }
    match resolution {
        Some(resolution) => render_resolution(&resolution),
        None => println!(
            "No storage location at ({}, {})",
            args.longitude, args.latitude
        ),
    }
    Ok(())
}

async fn handle_validate(context: &CliContext, args: ValidateArgs, json: bool) -> Result<()> {
    let selection = HierarchySelection {
        warehouse_id: args.warehouse_id,
        storage_area_id: args.storage_area_id,
        storage_location_id: args.storage_location_id,
        storage_bin_id: args.storage_bin_id,
    };
    let report = HierarchyValidator::new(context.db.clone())
        .validate(selection)
        .await
        .context("failed to validate hierarchy")?;

    if json {
        return print_json(&report);
    }
    render_validation(&report);
    Ok(())
}

async fn handle_hierarchy(context: &CliContext, args: HierarchyArgs, json: bool) -> Result<()> {
    let tree = HierarchyService::new(context.db.clone())
        .warehouse_tree(args.warehouse_id)
        .await
        .context("failed to load hierarchy")?;

    if json {
        return print_json(&tree);
    }
    render_tree(&tree);
    Ok(())
}

async fn handle_utilization(
    context: &CliContext,
    args: UtilizationArgs,
    json: bool,
) -> Result<()> {
    let service = HierarchyService::new(context.db.clone());
    let utilization = match (args.storage_area_id, args.warehouse_id) {
        (Some(area_id), _) => service.area_utilization(area_id).await,
        (None, Some(warehouse_id)) => service.warehouse_utilization(warehouse_id).await,
        (None, None) => anyhow::bail!("pass --storage-area-id or --warehouse-id"),
    }
    .context("failed to compute utilization")?;

    if json {
        return print_json(&utilization);
    }
    render_utilization(&utilization);
    Ok(())
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
    _event_sender: Arc<EventSender>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        let (event_sender, event_rx) = EventSender::channel(config.event_channel_capacity);
        tokio::spawn(process_events(event_rx));

        Ok(Self {
            config,
            db,
            _event_sender: Arc::new(event_sender),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_resolution(resolution: &Resolution) {
    println!(
        "Warehouse {} (id {}) > area {} (id {}) > location {} (id {})",
        resolution.warehouse.code,
        resolution.warehouse.id,
        resolution.storage_area.code,
        resolution.storage_area.id,
        resolution.storage_location.code,
        resolution.storage_location.id
    );
}

fn render_validation(report: &HierarchyValidation) {
    if report.valid {
        println!("Hierarchy selection is consistent");
        return;
    }
    println!("{} issue(s) found:", report.errors.len());
    for issue in &report.errors {
        println!("- {}", issue.message);
    }
}

fn render_tree(tree: &WarehouseTree) {
    println!(
        "{} {} ({}, {:.1} m²){}",
        tree.warehouse.code,
        tree.warehouse.name,
        tree.warehouse.warehouse_type,
        tree.warehouse.area_m2,
        inactive_marker(tree.warehouse.active)
    );
    for node in &tree.storage_areas {
        let indent = if node.area.parent_area_id.is_some() { "    " } else { "  " };
        println!(
            "{}{} ({:.1} m²){}",
            indent,
            node.area.code,
            node.area.area_m2,
            inactive_marker(node.area.active)
        );
        for location in &node.storage_locations {
            println!(
                "{}  {} @ ({}, {}){}",
                indent,
                location.location.code,
                location.location.longitude,
                location.location.latitude,
                inactive_marker(location.location.active)
            );
            for bin in &location.storage_bins {
                println!("{}    {} [{}]", indent, bin.code, bin.status);
            }
        }
    }
}

fn render_utilization(utilization: &Utilization) {
    println!(
        "{} {}: {:.2}% ({:.1} of {:.1} m², {} children)",
        utilization.level,
        utilization.code,
        utilization.utilization_percent,
        utilization.used_area_m2,
        utilization.total_area_m2,
        utilization.children
    );
}

fn inactive_marker(active: bool) -> &'static str {
    if active {
        ""
    } else {
        " [inactive]"
    }
}
