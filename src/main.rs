//! openschema CLI
//!
//! Runs one CRUD operation against a configured store and prints the result
//! as JSON.
//!
//! # Commands
//!
//! - `get-all` - Print every record in a collection
//! - `get` - Print the first record matching a field value
//! - `insert` - Insert a JSON record
//! - `update` - Replace the record matching a field value
//! - `delete` - Delete the record matching a field value

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use openschema::services::store::traits::types::{ENV_CONNECTION, ENV_DATABASE, ENV_PROVIDER};
use openschema::{BlockingStore, Record, StoreConfig};

/// Uniform CRUD access to redb, MongoDB, Redis, PostgreSQL and SQLite.
#[derive(Parser)]
#[command(name = "openschema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provider name (redb, mongodb, redis, postgres, sqlite); overrides OPENSCHEMA_PROVIDER
    #[arg(global = true, long)]
    provider: Option<String>,

    /// Connection string, URL or file path; overrides OPENSCHEMA_CONNECTION
    #[arg(global = true, long)]
    connection: Option<String>,

    /// Database name (MongoDB); overrides OPENSCHEMA_DATABASE
    #[arg(global = true, long)]
    database: Option<String>,

    /// Enable debug logging
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every record in a collection
    GetAll { collection: String },

    /// Print the first record whose field equals the value
    Get {
        collection: String,
        field: String,
        value: String,
    },

    /// Insert a record given as a JSON object
    Insert { collection: String, json: String },

    /// Replace the record whose field equals the value
    Update {
        collection: String,
        field: String,
        value: String,
        json: String,
    },

    /// Delete the record whose field equals the value
    Delete {
        collection: String,
        field: String,
        value: String,
    },
}

impl Cli {
    /// Command-line flags win over the `OPENSCHEMA_*` environment variables.
    fn store_config(&self) -> Result<StoreConfig> {
        StoreConfig::from_lookup(|key| {
            let flag = match key {
                ENV_PROVIDER => self.provider.clone(),
                ENV_CONNECTION => self.connection.clone(),
                ENV_DATABASE => self.database.clone(),
                _ => None,
            };
            flag.or_else(|| std::env::var(key).ok())
        })
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(store: &BlockingStore, command: Commands) -> Result<()> {
    match command {
        Commands::GetAll { collection } => {
            let records = store.get_all(&collection)?;
            print_json(&Value::Array(records.into_iter().map(Value::from).collect()))
        }
        Commands::Get {
            collection,
            field,
            value,
        } => {
            let found = store.get_by_field(&collection, &field, &value)?;
            print_json(&found.map(Value::from).unwrap_or(Value::Null))
        }
        Commands::Insert { collection, json } => {
            let record = Record::from_json_str(&json)?;
            print_json(&Value::Bool(store.insert(&collection, record)?))
        }
        Commands::Update {
            collection,
            field,
            value,
            json,
        } => {
            let record = Record::from_json_str(&json)?;
            print_json(&Value::Bool(store.update(&collection, &field, &value, record)?))
        }
        Commands::Delete {
            collection,
            field,
            value,
        } => print_json(&Value::Bool(store.delete(&collection, &field, &value)?)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.store_config()?;
    let store = BlockingStore::from_config(&config)?;

    let result = run(&store, cli.command);
    store.close()?;
    result
}
