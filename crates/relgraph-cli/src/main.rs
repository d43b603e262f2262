use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relgraph_catalog::{CardinalityComparer, MockRecordCounter};
use relgraph_constraints::{parse_declarations, ConstraintSet};
use relgraph_core::{Config, OrderDirection};
use relgraph_graph::GraphError;

/// Relgraph - Foreign key graphs, join chains and dependency order
#[derive(Parser)]
#[command(name = "relgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: relgraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON file with constraint declarations
    #[arg(long, global = true, default_value = "constraints.json")]
    constraints: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables in dependency order
    Tables {
        /// Ordering direction (defaults to the configured one)
        #[arg(short, long)]
        direction: Option<OrderDirection>,
    },

    /// Show what a table references and what references it
    Refs {
        /// Table name
        table: String,
    },

    /// Resolve the join chain between two tables
    Join {
        /// Referencing table
        from: String,

        /// Referenced table
        to: String,
    },

    /// Order multi-column constraint columns by cardinality
    Prioritize {
        /// JSON object mapping schema.table.column to record counts
        #[arg(long)]
        counts: PathBuf,
    },

    /// Summarize constraints and report reference cycles
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("relgraph.toml").exists() {
        Config::from_file(Path::new("relgraph.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    let mut set = load_constraints(&config, &cli.constraints, cli.verbose)?;

    match cli.command {
        Commands::Tables { direction } => {
            tables_command(&set, direction.unwrap_or(config.ordering.direction))
        }
        Commands::Refs { table } => refs_command(&set, &table),
        Commands::Join { from, to } => join_command(&set, &from, &to),
        Commands::Prioritize { counts } => prioritize_command(&mut set, &counts, cli.verbose),
        Commands::Check => check_command(&set),
    }
}

/// Read declarations and build the constraint set
fn load_constraints(config: &Config, path: &Path, verbose: bool) -> Result<ConstraintSet> {
    if verbose {
        eprintln!("{} {}", "Loading constraints from:".cyan(), path.display());
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read constraints file {}", path.display()))?;
    let declarations = parse_declarations(&json)?;

    let mut set = ConstraintSet::from_config(config);
    let added = set.extend_declarations(&declarations)?;
    tracing::info!(pairs = added, constraints = set.len(), "loaded constraints");

    Ok(set)
}

/// Tables command - dependency-ordered table list
fn tables_command(set: &ConstraintSet, direction: OrderDirection) -> Result<()> {
    let tables = set.list_tables_sorted_by(direction)?;

    println!("{} ({})", "Tables".bold(), direction.to_string().dimmed());
    for (i, table) in tables.iter().enumerate() {
        println!("  {}. {}", i + 1, table.green());
    }

    Ok(())
}

/// Refs command - direct references in both directions
fn refs_command(set: &ConstraintSet, table: &str) -> Result<()> {
    let graph = set.reference_graph();

    println!("{} {}", "Table:".bold(), table.green());

    let references = graph.direct_references(table);
    println!("{} {}", "References:".bold(), references.len());
    for referenced in &references {
        let names: Vec<&str> = set
            .find_between(table, referenced)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        println!("  -> {} {}", referenced.yellow(), format!("[{}]", names.join(", ")).dimmed());
    }

    let referencing = graph.referencing_tables(table);
    println!("{} {}", "Referenced by:".bold(), referencing.len());
    for source in &referencing {
        println!("  <- {}", source.yellow());
    }

    let indirect: Vec<&str> = graph
        .reachable_tables(table)
        .into_iter()
        .filter(|t| !references.contains(t))
        .collect();
    if !indirect.is_empty() {
        println!("{} {}", "Indirectly references:".bold(), indirect.join(", "));
    }

    Ok(())
}

/// Join command - chain of tables joining `from` to `to`
fn join_command(set: &ConstraintSet, from: &str, to: &str) -> Result<()> {
    let graph = set.reference_graph();

    let Some(chain) = graph.join_chain(from, to) else {
        println!("{}", format!("✗ {} does not reference {}", from, to).red());
        return Ok(());
    };

    println!("{} {}", "Join chain:".bold(), chain.join(" <- ").green());
    println!();

    // chain runs from the referenced table back to the source
    for hop in chain.windows(2) {
        let (referenced, table) = (&hop[0], &hop[1]);
        println!("  {} -> {}", table.cyan(), referenced.cyan());

        for constraint in set.find_between(table, referenced) {
            let pairs: Vec<String> = constraint
                .columns
                .iter()
                .map(|pair| format!("{} = {}", pair.column.column, pair.referenced_column.column))
                .collect();
            println!("    {} {}", constraint.name.yellow(), pairs.join(" AND "));
        }
    }

    Ok(())
}

/// Prioritize command - cardinality order for multi-column constraints
fn prioritize_command(set: &mut ConstraintSet, counts: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading record counts from:".cyan(), counts.display());
    }

    let json = std::fs::read_to_string(counts)
        .with_context(|| format!("Failed to read counts file {}", counts.display()))?;
    let counter = MockRecordCounter::from_json(&json)?
        .with_name("File")
        .with_name_comparer(set.name_comparer());

    let mut comparer = CardinalityComparer::new(&counter, set.name_comparer());
    set.prioritize_multiple(&mut comparer)?;

    if verbose {
        eprintln!("{} {}", "Record counts fetched:".cyan(), comparer.fetch_count());
    }

    for constraint in set.find_all_multiple() {
        println!("{} ({})", constraint.name.bold(), constraint.table().unwrap_or("?"));
        for pair in &constraint.columns {
            let count = comparer
                .cached_count(&pair.column)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  {}. {} {}",
                pair.filter_order + 1,
                pair.column.column.green(),
                format!("({} rows)", count).dimmed()
            );
        }
    }

    Ok(())
}

/// Check command - constraint summary and cycle detection
fn check_command(set: &ConstraintSet) -> Result<()> {
    let graph = set.reference_graph();

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Constraint Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Constraints:".bold(), set.len());
    println!("  Single-column: {}", set.find_all_single().len());
    println!("  Multi-column:  {}", set.find_all_multiple().len());
    println!("{} {}", "Tables:".bold(), set.distinct_tables().len());
    println!("{} {}", "References:".bold(), graph.len());

    let self_references: Vec<&str> = graph
        .edges()
        .iter()
        .filter(|edge| edge.is_self_reference(graph.names()))
        .map(|edge| edge.table.as_str())
        .collect();
    if !self_references.is_empty() {
        println!("{} {}", "Self references:".bold(), self_references.join(", ").yellow());
    }
    println!();

    match set.list_tables_sorted() {
        Ok(_) => {
            println!("{}", "✓ No reference cycles".green());
            Ok(())
        }
        Err(GraphError::Cycle(tables)) => {
            println!("{} {}", "✗ Reference cycle among:".red().bold(), tables.join(", "));
            std::process::exit(1);
        }
    }
}
