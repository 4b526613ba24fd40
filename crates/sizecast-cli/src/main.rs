//! sizecast CLI: collection sizing and query cost estimation.

use clap::{Parser, Subcommand};
use sizecast_core::stats::DatasetStatistics;
use sizecast_query::{CostModel, DesignMap, Query};
use sizecast_schema::EntityGraph;
use sizecast_sizer::{format_bytes, DesignRecord, SizeCache, Sizer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sizecast")]
#[command(about = "Analytical storage and query cost estimation for document databases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-collection sizes for a schema
    Sizes {
        /// Path to the JSON schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Design signature the sizes belong to (e.g. DB0)
        #[arg(long, default_value = "DB0")]
        signature: String,

        /// Free-text description stored with the cache record
        #[arg(long, default_value = "")]
        description: String,

        /// Size cache file to update with the computed record
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Estimate the cost of a structured query
    Cost {
        /// Path to the structured query JSON file
        #[arg(short, long)]
        query: PathBuf,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,

        /// Size cache file holding precomputed collection sizes
        #[arg(long)]
        cache: PathBuf,

        /// Design signature to estimate under (e.g. DB2)
        #[arg(long, default_value = "DB0")]
        signature: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sizes {
            schema,
            signature,
            description,
            cache,
        } => {
            if let Err(e) = compute_sizes(&schema, &signature, &description, cache.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Cost {
            query,
            schema,
            cache,
            signature,
        } => {
            if let Err(e) = estimate_cost(&query, &schema, &cache, &signature) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_graph(schema_path: &Path) -> Result<EntityGraph, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(schema_path)?;
    let schema: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(sizecast_schema::extract(&schema))
}

fn compute_sizes(
    schema_path: &Path,
    signature: &str,
    description: &str,
    cache_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = DatasetStatistics::default();
    let graph = load_graph(schema_path)?;
    let sizer = Sizer::new(&graph, &stats);
    let sizes = sizer.collection_sizes();

    println!("Collection sizes ({})", signature);
    println!("==================");
    for (name, c) in &sizes.collections {
        println!(
            "  {}: {} docs x {} B/doc = {}",
            name,
            c.num_docs,
            c.doc_size_bytes,
            format_bytes(c.collection_size)
        );
    }
    println!("  Database total: {}", format_bytes(sizes.total_bytes));

    if let Some(cache_path) = cache_path {
        let mut cache = SizeCache::load_or_empty(cache_path)?;
        cache.upsert(signature, DesignRecord::from_sizes(description, &sizes));
        cache.save(cache_path)?;
        println!("Updated {} in {}", signature, cache_path.display());
    }

    Ok(())
}

fn estimate_cost(
    query_path: &Path,
    schema_path: &Path,
    cache_path: &Path,
    signature: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = DatasetStatistics::default();
    let graph = load_graph(schema_path)?;
    let sizer = Sizer::new(&graph, &stats);
    let design = DesignMap::default();

    let cache = SizeCache::load(cache_path)?;
    let record = cache.get(signature)?;

    let raw = fs::read_to_string(query_path)?;
    let query: Query = serde_json::from_str(&raw)?;

    let model = CostModel::new(&stats, &graph, &sizer, &design, signature, record);
    let report = model.estimate(&query)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
