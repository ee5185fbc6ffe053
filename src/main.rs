//! CLI interface for building and serving a vector index

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vecsearch::persistence::codec;
use vecsearch::{engine, IndexConfig, IndexKind, VectorCollection};

#[derive(Parser)]
#[command(name = "vecsearch")]
#[command(about = "Top-k cosine similarity search over flat binary embedding files", long_about = None)]
struct Cli {
    /// Index type to use for search
    #[arg(long, global = true, value_enum)]
    index: Option<IndexKind>,

    /// JSON file with index parameters; flags given here take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of components per embedding
    #[arg(long, global = true)]
    dim: Option<usize>,

    /// Maximum points per spatial tree leaf
    #[arg(long, global = true)]
    leaf_capacity: Option<usize>,

    /// Number of hash tables
    #[arg(long, global = true)]
    tables: Option<usize>,

    /// Bits per hash key
    #[arg(long, global = true)]
    bits: Option<usize>,

    /// Seed for hash hyperplanes, and for the data written by `generate`
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw embeddings and save them as an index file
    Build {
        /// Raw embeddings file
        embeddings_file: PathBuf,
        /// Where to write the index
        output_index_file: PathBuf,
        /// Number of embeddings in the input
        num_embeddings: usize,
    },
    /// Load an index and answer queries from stdin
    Search {
        /// Index file written by `build`
        index_file: PathBuf,
        /// Number of embeddings in the index
        num_embeddings: usize,
    },
    /// Write seeded uniform random embeddings
    Generate {
        /// Number of embeddings to generate
        #[arg(long)]
        num_embeddings: usize,
        /// Output file
        #[arg(long)]
        output: PathBuf,
    },
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn index_config(&self) -> Result<IndexConfig> {
        let mut config = match &self.config {
            Some(path) => IndexConfig::from_json_file(path)?,
            None => IndexConfig::default(),
        };
        if let Some(index) = self.index {
            config.index = index;
        }
        if let Some(dim) = self.dim {
            config.dimension = dim;
        }
        if let Some(leaf_capacity) = self.leaf_capacity {
            config.leaf_capacity = leaf_capacity;
        }
        if let Some(tables) = self.tables {
            config.num_tables = tables;
        }
        if let Some(bits) = self.bits {
            config.num_bits = bits;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.index_config().context("invalid configuration")?;

    match cli.command {
        Commands::Build {
            embeddings_file,
            output_index_file,
            num_embeddings,
        } => {
            tracing::info!(index = config.index.name(), "mode: build");
            engine::build(&embeddings_file, &output_index_file, num_embeddings, &config)
                .with_context(|| format!("failed to build index from {}", embeddings_file.display()))?;
        }
        Commands::Search {
            index_file,
            num_embeddings,
        } => {
            tracing::info!(index = config.index.name(), "mode: search");
            let stdin = io::stdin().lock();
            let stdout = BufWriter::new(io::stdout().lock());
            engine::search(&index_file, num_embeddings, &config, stdin, stdout)
                .with_context(|| format!("search over {} failed", index_file.display()))?;
        }
        Commands::Generate {
            num_embeddings,
            output,
        } => {
            tracing::info!(
                num_embeddings,
                dim = config.dimension,
                seed = config.seed,
                "generating embeddings"
            );
            let vectors = VectorCollection::random(num_embeddings, config.dimension, config.seed);
            codec::save(&output, &vectors)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(path = %output.display(), "saved raw embeddings");
        }
    }

    Ok(())
}
