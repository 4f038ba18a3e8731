//! table-fetcher CLI - catalog listing, browsing and rule evaluation for MySQL and Oracle.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use table_fetcher::{
    drivers, BrowseOutcome, ColumnFilter, Config, DataSourceDescriptor, Dialect, FetchError,
    RuleRowSet, TableFetcher, TableFilter, TableRef,
};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "table-fetcher")]
#[command(about = "Table metadata and ad-hoc queries for MySQL and Oracle")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the base tables of a schema
    Tables {
        /// Override the configured schema
        #[arg(long)]
        schema: Option<String>,

        /// Only tables whose name matches this LIKE pattern
        #[arg(long)]
        like: Option<String>,
    },

    /// List the columns of a table whose type cannot be captured
    Columns {
        /// Table name
        #[arg(long)]
        table: String,

        /// Override the configured schema
        #[arg(long)]
        schema: Option<String>,
    },

    /// Describe every column of a table
    Describe {
        /// Table name
        #[arg(long)]
        table: String,

        /// Override the configured schema
        #[arg(long)]
        schema: Option<String>,
    },

    /// Run a SELECT with ordering and a row cap added
    Browse {
        /// The SELECT statement
        #[arg(long)]
        sql: String,

        /// Augment for this dialect instead of the data source's (mysql, oracle)
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Evaluate rule SQL against rows loaded into a temporary table
    Rule {
        /// Rule SQL selecting from the temporary table
        #[arg(long)]
        sql: String,

        /// JSON file holding an array of string arrays
        #[arg(long)]
        rows: PathBuf,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), FetchError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config::load(&cli.config)?;
    let source = config.descriptor()?;
    info!("Loaded configuration from {:?}", cli.config);

    let fetcher = TableFetcher::for_source(&source);

    match cli.command {
        Commands::Tables { schema, like } => {
            let mut filter = TableFilter::new(schema.unwrap_or_else(|| source.schema.clone()));
            if let Some(pattern) = like {
                filter = filter.with_name_like(pattern);
            }
            let conn = drivers::connect(&source).await?;
            let tables = fetcher.list_tables(conn, &filter).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                println!("Tables in {}: {}", filter.schema, tables.len());
                for table in &tables {
                    println!("  {}", table.table_name);
                }
            }
        }

        Commands::Columns { table, schema } => {
            let filter = ColumnFilter::new(schema.unwrap_or_else(|| source.schema.clone()), table);
            let conn = drivers::connect(&source).await?;
            let columns = fetcher.list_columns(conn, &filter).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else if columns.is_empty() {
                println!("All columns of {} are supported", filter.table_name);
            } else {
                println!("Unsupported columns of {}:", filter.table_name);
                for column in &columns {
                    match &column.incompatible_column {
                        Some(tag) => println!(
                            "  {} ({}) incompatible: {}",
                            column.column_name, column.data_type, tag
                        ),
                        None => println!("  {} ({})", column.column_name, column.data_type),
                    }
                }
            }
        }

        Commands::Describe { table, schema } => {
            let table = TableRef::new(
                source.dialect,
                schema.unwrap_or_else(|| source.schema.clone()),
                table,
            );
            let conn = drivers::connect(&source).await?;
            let columns = fetcher.describe_table_columns(conn, &table).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                println!("Columns of {}.{}:", table.schema, table.table_name);
                for column in &columns {
                    println!(
                        "  {:<30} {:<20} primary: {}",
                        column.column_name,
                        column.data_type,
                        column.primary_flag()
                    );
                }
            }
        }

        Commands::Browse { sql, dialect } => {
            let dialect = dialect.as_deref().map(Dialect::parse).transpose()?;
            let conn = drivers::connect(&source).await?;

            match fetcher.browse_table(conn, &sql, dialect).await? {
                BrowseOutcome::Rejected => println!("rejected: not a SELECT"),
                BrowseOutcome::Rows(rows) => {
                    if cli.output_json {
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    } else {
                        for row in &rows {
                            println!("{}", serde_json::to_string(row)?);
                        }
                        println!("\n{} rows", rows.len());
                    }
                }
            }
        }

        Commands::Rule { sql, rows } => {
            let input = read_rule_rows(&rows)?;
            let conn = drivers::connect(&source).await?;
            let output = fetcher.evaluate_rule(conn, &sql, &input).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for row in output.rows() {
                    println!("{}", row.join("\t"));
                }
                println!("\n{} rows", output.len());
            }
        }

        Commands::HealthCheck => health_check(&fetcher, &source, cli.output_json).await?,
    }

    Ok(())
}

fn read_rule_rows(path: &Path) -> Result<RuleRowSet, FetchError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn health_check(
    fetcher: &TableFetcher,
    source: &DataSourceDescriptor,
    output_json: bool,
) -> Result<(), FetchError> {
    let start = Instant::now();
    let outcome = match drivers::connect(source).await {
        Ok(conn) => fetcher.ping(conn).await,
        Err(e) => Err(e),
    };
    let latency_ms = start.elapsed().as_millis() as u64;

    if output_json {
        let report = serde_json::json!({
            "dialect": source.dialect.name(),
            "host": source.host,
            "connected": outcome.is_ok(),
            "latency_ms": latency_ms,
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Health Check Results:");
        println!(
            "  {} ({}:{}): {} ({}ms)",
            source.dialect,
            source.host,
            source.port,
            if outcome.is_ok() { "OK" } else { "FAILED" },
            latency_ms
        );
        if let Err(ref err) = outcome {
            println!("    Error: {}", err);
        }
    }

    outcome
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so --output-json stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
