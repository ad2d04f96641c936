use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sports_registry::{EntityKind, Key, Menu, Registry, RegistryConfig};

#[derive(Parser)]
#[command(name = "sports-registry")]
#[command(about = "Manage athletes, coaches and disciplines stored in CSV files")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the CSV stores (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a record; values in schema order ("" for empty optional fields)
    Add {
        entity: EntityKind,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Show one record
    Show {
        entity: EntityKind,
        /// Key value(s); disciplines take name and category
        #[arg(required = true)]
        key: Vec<String>,
    },

    /// Change one field of a record
    Edit {
        entity: EntityKind,
        #[arg(required = true)]
        key: Vec<String>,
        #[arg(short, long)]
        field: String,
        #[arg(short, long, allow_hyphen_values = true)]
        value: String,
    },

    /// Remove a record
    Remove {
        entity: EntityKind,
        #[arg(required = true)]
        key: Vec<String>,
    },

    /// List all records of a kind
    List {
        entity: EntityKind,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive menus (default)
    Menu,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RegistryConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let registry = Registry::open(&config.data_dir).with_context(|| {
        format!("Failed to open stores in {}", config.data_dir.display())
    })?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Add { entity, values } => {
            let record = registry.repository(entity).create(values)?;
            println!("{}", record);
        }
        Commands::Show { entity, key } => {
            let record = registry.repository(entity).read(Key::from(key))?;
            println!("{}", record);
        }
        Commands::Edit {
            entity,
            key,
            field,
            value,
        } => {
            let record = registry
                .repository(entity)
                .update(Key::from(key), &field, &value)?;
            println!("{}", record);
        }
        Commands::Remove { entity, key } => {
            let key = Key::from(key);
            registry.repository(entity).delete(&key)?;
            println!("Removed {} {}", entity, key);
        }
        Commands::List { entity, json } => {
            let records = registry.repository(entity).list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}\n", record);
                }
                println!("{} {} record(s)", records.len(), entity);
            }
        }
        Commands::Menu => {
            let stdin = io::stdin();
            Menu::new(&registry, stdin.lock(), io::stdout()).run()?;
        }
    }

    Ok(())
}
