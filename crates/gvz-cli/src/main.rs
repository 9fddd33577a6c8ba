//! gvz CLI - Google Sheets as an ad-hoc database
//!
//! Usage:
//!   gvz list                          List databases the signed-in user can write
//!   gvz reload <db>                   Re-read one database
//!   gvz create --template club.toml   Create a database from a template
//!   gvz append <db> <table> '<json>'  Append a row or an array of rows
//!   gvz select <db> <table> "a = 1"   Print matching rows
//!   gvz types                         Print the datatype format table
//!   gvz whoami                        Print the configured profile
//!
//! Tables are addressed by sheet id or by name.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gvz_schema::{registry, Database, SheetId, TYPE_TAGS};
use gvz_sync::{SyncGateway, TokenAuth};
use std::path::PathBuf;
use std::sync::Arc;

use config::{load_template, CliConfig};

#[derive(Parser)]
#[command(name = "gvz")]
#[command(about = "Google Sheets as an ad-hoc database", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(short, long, default_value = "gvz.toml", global = true)]
    config: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Only consider spreadsheets titled "[FLAIR] ..."
    #[arg(long, global = true)]
    flair: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List databases
    List {
        /// Print databases as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-read a single database
    Reload {
        /// Spreadsheet id
        database: String,
    },
    /// Create a database from a JSON or TOML template
    Create {
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Append rows to a table
    Append {
        database: String,
        table: String,
        /// A JSON row (`["a", 1]`) or array of rows
        rows: String,
    },
    /// Print rows of a table
    Select {
        database: String,
        table: String,
        /// `header = value`, or empty for every row
        #[arg(default_value = "")]
        filter: String,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the datatype format table
    Types,
    /// Print the configured user profile
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mut config = CliConfig::load(&cli.config)?;
    if let Some(flair) = cli.flair {
        config.gateway.flair = Some(flair).filter(|f| !f.is_empty());
    }

    match cli.command {
        Commands::Types => {
            print_types();
            return Ok(());
        }
        Commands::Whoami => {
            let profile = config.auth.profile();
            println!("{} {} <{}>", profile.given_name, profile.family_name, profile.email);
            if config.auth.access_token.is_none() {
                println!("(no access token configured, set GVZ_ACCESS_TOKEN)");
            }
            return Ok(());
        }
        _ => {}
    }

    let auth = Arc::new(TokenAuth::from_config(&config.auth));
    let gateway =
        SyncGateway::google(&config.gateway, auth).context("Failed to build gateway")?;
    gateway.sign_in().await.context("Sign-in failed")?;

    match cli.command {
        Commands::List { json } => {
            let summary = gateway.reload_all().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary.databases)?);
            } else {
                for database in &summary.databases {
                    print_database(database);
                }
            }
            if summary.skipped > 0 {
                eprintln!("{} of {} spreadsheets could not be read", summary.skipped, summary.total);
            }
        }
        Commands::Reload { database } => {
            let database = gateway.reload_database(&database).await?;
            print_database(&database);
        }
        Commands::Create { template } => {
            let template = load_template(&template)?;
            let database = gateway.create_database(&template).await?;
            println!("Created {}", database.id());
            print_database(&database);
        }
        Commands::Append {
            database,
            table,
            rows,
        } => {
            let input: serde_json::Value =
                serde_json::from_str(&rows).context("Rows must be JSON")?;
            let loaded = gateway.reload_database(&database).await?;
            let table_id = resolve_table(&loaded, &table)?;
            let response = gateway.push_json(&database, table_id, &input).await?;
            let updated = response
                .updates
                .and_then(|u| u.updated_rows)
                .unwrap_or_default();
            println!("Appended {} row(s)", updated);
        }
        Commands::Select {
            database,
            table,
            filter,
            json,
        } => {
            let loaded = gateway.reload_database(&database).await?;
            let table_id = resolve_table(&loaded, &table)?;
            let result = gateway.select(&database, table_id, &filter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let headers: Vec<&str> = result.columns.iter().map(|c| c.header()).collect();
                println!("{}", headers.join("\t"));
                for row in &result.rows {
                    println!("{}", row.join("\t"));
                }
            }
        }
        Commands::Types | Commands::Whoami => {}
    }

    Ok(())
}

/// A table argument is a sheet id when numeric, otherwise a sheet name
fn resolve_table(database: &Database, table: &str) -> Result<SheetId> {
    if let Ok(id) = table.parse::<SheetId>() {
        if database.find_table(id).is_some() {
            return Ok(id);
        }
    }
    database
        .find_table_by_name(table)
        .and_then(|t| t.id())
        .with_context(|| format!("No table {} in {}", table, database.name()))
}

fn print_database(database: &Database) {
    println!("{}  ({})", database.name(), database.id());
    for table in database.tables() {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|c| match c.datatype() {
                Some(datatype) => format!("{}: {}", c.header(), datatype),
                None => format!("{}: ?", c.header()),
            })
            .collect();
        println!(
            "  [{}] {}  {}",
            table.id().unwrap_or_default(),
            table.name(),
            columns.join(", ")
        );
    }
}

fn print_types() {
    println!("Types: {}", TYPE_TAGS.join(", "));
    for (datatype, spec) in registry::entries() {
        println!("{:<12} {}  fields={}", datatype.to_string(), spec.cell, spec.fields_mask());
    }
}

fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();

    Ok(())
}
