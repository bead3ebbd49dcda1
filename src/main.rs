//! A thin CLI over the `parqsql` engine (§6: no CLI, no files, no
//! environment variables are part of the core contract — everything here is
//! ambient plumbing around `parse`/`execute`).

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use parqsql::{execute, parse, ParquetReader};

#[derive(Debug, ClapParser)]
#[command(name = "parqsql", about = "Run a SQL query against parquet files")]
struct Cli {
    /// SQL query text, e.g. "SELECT * FROM data/*.parquet WHERE age > 18"
    query: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let query = match parse(&cli.query) {
        Ok(query) => query,
        Err(err) => {
            eprintln!("parse error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&query, Arc::new(ParquetReader::new())) {
        Ok(rows) => {
            for row in &rows {
                let rendered: Vec<String> =
                    row.iter().map(|(k, v)| format!("{k}={v}")).collect();
                println!("{}", rendered.join("  "));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("execution error: {err}");
            ExitCode::FAILURE
        }
    }
}
