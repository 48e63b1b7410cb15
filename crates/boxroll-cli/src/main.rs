//! Boxroll CLI - strongbox crafting policy management
//!
//! Usage:
//!   boxroll init                         Write default settings and catalog
//!   boxroll show                         Show effective settings
//!   boxroll catalog list                 List catalog mods and their flags
//!   boxroll catalog desire <name>        Flag a mod as desired
//!   boxroll catalog undesire <name>      Flag a mod as undesired
//!   boxroll catalog require <cat> <n>    Set required desired-mod count
//!   boxroll check <affix>...             Evaluate affix lines against the policy

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use boxroll_catalog::{matcher, CatalogStore};
use boxroll_core::{Category, Rarity, Settings};
use boxroll_engine::{select_action, ItemBudget, SelectorOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "boxroll")]
#[command(author, version, about = "Strongbox crafting decision engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding boxroll.toml and the mod catalog
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings and catalog files
    Init,

    /// Show effective settings
    Show,

    /// Mod catalog management
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Evaluate affix lines against the policy and suggest the next action
    Check {
        /// Affix lines, one argument per rendered line
        affixes: Vec<String>,

        /// Container category
        #[arg(short, long, default_value = "regular")]
        category: CliCategory,

        /// Observed rarity
        #[arg(short, long, default_value = "rare")]
        rarity: CliRarity,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List catalog mods and their flags
    List {
        /// Show only this category
        #[arg(short, long)]
        category: Option<CliCategory>,
    },

    /// Flag a mod as desired (clears the undesired flag)
    Desire {
        /// Mod name, e.g. regular_quantity
        name: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Flag a mod as undesired (clears the desired flag)
    Undesire {
        /// Mod name, e.g. regular_freezes
        name: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Set how many desired mods a category needs (1-3)
    Require {
        category: CliCategory,
        count: usize,
    },
}

/// CLI-friendly category enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCategory {
    Regular,
    Arcanist,
    Diviner,
    Cartographer,
}

impl From<CliCategory> for Category {
    fn from(c: CliCategory) -> Self {
        match c {
            CliCategory::Regular => Category::Regular,
            CliCategory::Arcanist => Category::Arcanist,
            CliCategory::Diviner => Category::Diviner,
            CliCategory::Cartographer => Category::Cartographer,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliRarity {
    Unidentified,
    Plain,
    Magic,
    Rare,
}

impl From<CliRarity> for Option<Rarity> {
    fn from(r: CliRarity) -> Self {
        match r {
            CliRarity::Unidentified => None,
            CliRarity::Plain => Some(Rarity::Plain),
            CliRarity::Magic => Some(Rarity::Magic),
            CliRarity::Rare => Some(Rarity::Rare),
        }
    }
}

fn catalog_path(dir: &PathBuf) -> PathBuf {
    dir.join("boxroll_mods.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => cmd_init(&cli.dir),
        Commands::Show => cmd_show(&cli.dir),
        Commands::Catalog { action } => cmd_catalog(&cli.dir, action),
        Commands::Check {
            affixes,
            category,
            rarity,
        } => cmd_check(&cli.dir, affixes, category.into(), rarity.into()),
    }
}

fn cmd_init(dir: &PathBuf) -> Result<()> {
    info!("Initializing boxroll configuration in {:?}", dir);

    Settings::write_default(dir).context("failed to write default settings")?;
    CatalogStore::load(catalog_path(dir)).context("failed to create default catalog")?;

    println!("Wrote {} and {}", dir.join("boxroll.toml").display(), catalog_path(dir).display());
    Ok(())
}

fn cmd_show(dir: &PathBuf) -> Result<()> {
    let settings = Settings::load_or_default(dir).context("failed to load settings")?;

    println!("incremental path:   {}", settings.use_incremental_path);
    println!("mod selection:      {}", settings.use_mod_selection);
    println!("upgrade-rare only:  {}", settings.upgrade_to_rare_only);
    println!("fast apply:         {} ({} ms)", settings.use_fast_apply, settings.fast_apply_delay_ms);
    println!("mid-step delay:     {} ms", settings.mid_step_delay_ms);
    println!("max distance:       {}", settings.max_target_distance);
    println!("debug logging:      {} ({})", settings.debug.enabled, settings.debug.log_path);
    for category in Category::ALL {
        let opts = settings.category(category);
        println!(
            "{category:<14} clear-upgrade={} quality={} required={}",
            opts.use_clear_upgrade, opts.use_quality_items, opts.required_desired_mods
        );
    }
    Ok(())
}

fn cmd_catalog(dir: &PathBuf, action: CatalogCommands) -> Result<()> {
    let mut store = CatalogStore::load(catalog_path(dir)).context("failed to load catalog")?;

    match action {
        CatalogCommands::List { category } => {
            let filter: Option<Category> = category.map(Into::into);
            for m in store.all_mods() {
                if filter.is_some_and(|c| c != m.category) {
                    continue;
                }
                let flag = if m.is_desired {
                    "+"
                } else if m.is_undesired {
                    "-"
                } else {
                    " "
                };
                println!("{flag} {:<30} [{}] {}", m.name, m.category, m.description);
            }
            for category in Category::ALL {
                if filter.is_none() || filter == Some(category) {
                    println!("{category}: requires {} desired mod(s)", store.required(category));
                }
            }
        }
        CatalogCommands::Desire { name, off } => {
            store.set_desired(&name, !off)?;
            println!("{name}: desired = {}", !off);
        }
        CatalogCommands::Undesire { name, off } => {
            store.set_undesired(&name, !off)?;
            println!("{name}: undesired = {}", !off);
        }
        CatalogCommands::Require { category, count } => {
            let category: Category = category.into();
            store.set_required(category, count)?;
            println!("{category}: requires {} desired mod(s)", store.required(category));
        }
    }
    Ok(())
}

fn cmd_check(
    dir: &PathBuf,
    affixes: Vec<String>,
    category: Category,
    rarity: Option<Rarity>,
) -> Result<()> {
    let settings = Settings::load_or_default(dir).context("failed to load settings")?;
    let store = CatalogStore::load(catalog_path(dir)).context("failed to load catalog")?;

    let mods = store.mods_by_category(category);
    let ready = matcher::evaluate(&affixes, &mods, store.required(category));
    println!("ready: {ready}");

    if !ready {
        // What the engine would do next with every item kind in stock
        let budget = ItemBudget {
            identify: true,
            clear: true,
            seed: true,
            augment: true,
            reroll_magic: true,
            upgrade_to_rare: true,
            quality: true,
        };
        let cat_opts = settings.category(category);
        let opts = SelectorOptions {
            use_clear_upgrade: match category {
                Category::Regular => !settings.use_incremental_path || settings.upgrade_to_rare_only,
                _ => cat_opts.use_clear_upgrade,
            },
            use_quality_items: cat_opts.use_quality_items,
            batch_quality: settings.use_fast_apply,
        };
        match select_action(&affixes, rarity, &budget, &opts) {
            Some(action) => println!("next action: {action}"),
            None => println!("next action: none"),
        }
    }
    Ok(())
}
