//! lsondb CLI
//!
//! Inspect and manage the tables under a database root.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lsondb::{Config, Locale, Result, TableStore};
use tracing_subscriber::{fmt, EnvFilter};

/// lsondb admin CLI
#[derive(Parser, Debug)]
#[command(name = "lsondb-cli")]
#[command(about = "Admin tool for lsondb table stores")]
#[command(version)]
struct Args {
    /// Database root directory
    #[arg(short, long, default_value = "./lson_data")]
    root: String,

    /// Culture tag used for number text (e.g. en-US, tr-TR)
    #[arg(short, long, default_value = "invariant")]
    locale: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tables
    List,

    /// Create an empty table
    Create {
        /// The table to create
        table: String,
    },

    /// Drop a table
    Drop {
        /// The table to drop
        table: String,
    },

    /// Print the raw rows of a table
    Lines {
        /// The table to print
        table: String,
    },

    /// Print the rows of a table split into columns
    Columns {
        /// The table to print
        table: String,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lsondb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .root_dir(&args.root)
        .locale(Locale::parse(&args.locale)?)
        .build();
    let store = TableStore::open(config)?;

    match args.command {
        Commands::List => {
            for table in store.tables()? {
                println!("{}", table);
            }
        }
        Commands::Create { table } => {
            if store.create(&table)? {
                println!("created {}", table);
            } else {
                println!("{} already exists", table);
            }
        }
        Commands::Drop { table } => {
            if store.drop(&table)? {
                println!("dropped {}", table);
            } else {
                println!("{} does not exist", table);
            }
        }
        Commands::Lines { table } => {
            for line in store.read_lines(&table)? {
                println!("{}", line);
            }
        }
        Commands::Columns { table } => {
            let separator = store.serializer().separators().column.clone();
            for (index, line) in store.read_lines(&table)?.iter().enumerate() {
                let columns: Vec<&str> = line.split(separator.as_str()).collect();
                println!("#{} ({} columns)", index + 1, columns.len());
                for (position, column) in columns.iter().enumerate() {
                    println!("  [{}] {}", position, column);
                }
            }
        }
    }

    Ok(())
}
