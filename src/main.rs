use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use setup_sheets_lib::{db, Part, PartListModel, PartRepository, PartStore};

#[derive(Debug, Parser)]
#[command(name = "setup-sheets", about = "Setup sheet records for CNC machinists", version)]
struct Cli {
    /// Optional explicit database path.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report the database location, schema version, and record count.
    Status {
        /// Emit a machine-readable JSON object instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Print the current setup sheets, newest first.
    List {
        /// Keep only sheets whose part name or notes contain this text.
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Print one setup sheet with its tool lists.
    Show { id: i64 },
}

#[tokio::main]
async fn main() {
    setup_sheets_lib::init_logging();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path().context("determine database path")?,
    };
    let pool = db::open_sqlite_pool(&db_path).await.context("open database")?;
    db::init_schema(&pool).await.context("initialize schema")?;

    let repo = PartRepository::new(PartStore::new(pool.clone()));

    match cli.command {
        Commands::Status { json } => {
            let (version,): (i64,) = sqlx::query_as("PRAGMA user_version;")
                .fetch_one(&pool)
                .await?;
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM parts")
                .fetch_one(&pool)
                .await?;
            if json {
                println!(
                    "{}",
                    json!({
                        "db_path": db_path.display().to_string(),
                        "schema_version": version,
                        "parts": count,
                    })
                );
            } else {
                println!("Database       : {}", db_path.display());
                println!("Schema version : {version}");
                println!("Setup sheets   : {count}");
            }
        }
        Commands::List { search } => {
            let model = PartListModel::new(repo);
            if let Some(term) = search {
                model.set_filter(term);
            }
            let mut visible = model.visible();
            let parts = visible.recv().await?;
            if parts.is_empty() {
                println!("No setup sheets.");
            } else {
                for part in parts {
                    println!("{:>4}  {}  [{}]", part.id, part.title, part.coordinates);
                }
            }
        }
        Commands::Show { id } => match repo.get_by_id(id).await? {
            Some(part) => print_part(&part),
            None => println!("No setup sheet with id {id}."),
        },
    }

    pool.close().await;
    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("no user data directory")?;
    Ok(base.join("setup-sheets").join("setup_sheets.sqlite3"))
}

fn print_part(part: &Part) {
    println!("#{} {}", part.id, part.title);
    println!("  Coordinates       : {}", part.coordinates);
    println!("  Bar size          : {}", part.bar_size);
    println!("  Collet size       : {}", part.sub_spindle_collet_size);
    println!("  Projection length : {}", part.projection_length);
    println!("  Main spindle tools:");
    for tool in &part.main_spindle_tools {
        println!("    {:<6} {}", tool.name, tool.description);
    }
    if !part.sub_spindle_tools.is_empty() {
        println!("  Sub spindle tools :");
        for tool in &part.sub_spindle_tools {
            println!("    {:<6} {}", tool.name, tool.description);
        }
    }
    if !part.content.is_empty() {
        println!("  Notes             : {}", part.content);
    }
}
