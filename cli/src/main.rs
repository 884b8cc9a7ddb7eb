mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_catalog_list, cmd_catalog_show, cmd_check_reset, cmd_check_toggle, cmd_plan_calories,
    cmd_plan_clear, cmd_plan_clear_all, cmd_plan_set, cmd_plan_show, cmd_shopping_export,
    cmd_shopping_list, load_catalog,
};
use crate::config::Config;
use cesta_core::service::PlannerService;

#[derive(Parser)]
#[command(
    name = "cesta",
    version,
    about = "A weekly meal planner and shopping list CLI",
    long_about = "\n\n   ██████╗███████╗███████╗████████╗ █████╗
  ██╔════╝██╔════╝██╔════╝╚══██╔══╝██╔══██╗
  ██║     █████╗  ███████╗   ██║   ███████║
  ██║     ██╔══╝  ╚════██║   ██║   ██╔══██║
  ╚██████╗███████╗███████║   ██║   ██║  ██║
   ╚═════╝╚══════╝╚══════╝   ╚═╝   ╚═╝  ╚═╝
       plan the week, shop it once.
"
)]
struct Cli {
    /// Plan identifier scoping the grid and checklist
    #[arg(long, global = true, default_value = "default")]
    plan: String,
    /// Recipe catalog JSON (default: catalog.json in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Per-client override JSON (default: overrides.json in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    overrides: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the weekly planner grid
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Render and export the aggregated shopping list
    Shopping {
        #[command(subcommand)]
        command: ShoppingCommands,
    },
    /// Manage the purchased checklist
    Check {
        #[command(subcommand)]
        command: CheckCommands,
    },
    /// Inspect the recipe catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Assign a recipe to a day and meal slot
    Set {
        /// Day: 0-6, monday-sunday, mon-sun, or today
        day: String,
        /// Meal slot: breakfast, lunch, dinner, snack
        slot: String,
        /// Recipe id from the catalog (must match the slot's category)
        recipe_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear one cell of the grid
    Clear {
        /// Day: 0-6, monday-sunday, mon-sun, or today
        day: String,
        /// Meal slot: breakfast, lunch, dinner, snack
        slot: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the whole week
    ClearAll {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the week as a grid
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the calorie total for one day
    Calories {
        /// Day: 0-6, monday-sunday, mon-sun, or today
        day: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ShoppingCommands {
    /// Show the sectioned shopping list with checked state
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the shopping list as CSV
    Export {
        /// Destination file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum CheckCommands {
    /// Toggle an item's purchased flag
    Toggle {
        /// Item key as shown by `shopping list` (e.g. "huevo-unidad")
        item: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Uncheck everything
    Reset {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List recipes, optionally filtered by category
    List {
        /// Category filter: breakfast, lunch, dinner, snack
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recipe in full, overrides applied
    Show {
        /// Recipe id
        recipe_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let catalog_path = cli.catalog.unwrap_or(config.catalog_path);
    let overrides_path = cli.overrides.unwrap_or(config.overrides_path);
    let catalog = load_catalog(&catalog_path, &overrides_path)?;
    let svc = PlannerService::new(&config.db_path, catalog)?;
    let plan = &cli.plan;

    match cli.command {
        Commands::Plan { command } => match command {
            PlanCommands::Set {
                day,
                slot,
                recipe_id,
                json,
            } => cmd_plan_set(&svc, plan, &day, &slot, &recipe_id, json),
            PlanCommands::Clear { day, slot, json } => {
                cmd_plan_clear(&svc, plan, &day, &slot, json)
            }
            PlanCommands::ClearAll { json } => cmd_plan_clear_all(&svc, plan, json),
            PlanCommands::Show { json } => cmd_plan_show(&svc, plan, json),
            PlanCommands::Calories { day, json } => cmd_plan_calories(&svc, plan, &day, json),
        },
        Commands::Shopping { command } => match command {
            ShoppingCommands::List { json } => cmd_shopping_list(&svc, plan, json),
            ShoppingCommands::Export { file } => cmd_shopping_export(&svc, plan, &file),
        },
        Commands::Check { command } => match command {
            CheckCommands::Toggle { item, json } => cmd_check_toggle(&svc, plan, &item, json),
            CheckCommands::Reset { json } => cmd_check_reset(&svc, plan, json),
        },
        Commands::Catalog { command } => match command {
            CatalogCommands::List { category, json } => {
                cmd_catalog_list(&svc, category.as_deref(), json)
            }
            CatalogCommands::Show { recipe_id, json } => {
                cmd_catalog_show(&svc, &recipe_id, json)
            }
        },
    }
}
