use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use heritage_cli::init;
use heritage_core::config::expand_path;
use heritage_core::data_processor::DataProcessor;
use heritage_embed::embedder_from_settings;
use heritage_vector::SimilarityIndex;

/// Build the similarity index from an introductions corpus.
#[derive(Parser)]
#[command(name = "heritage-indexer")]
struct Args {
    /// Introductions JSON (项目名称/类别/申报地区/保护单位/详细介绍)
    corpus: PathBuf,
    /// Output directory; defaults to index.dir from the configuration
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = init()?;
    let out = args.out.unwrap_or_else(|| expand_path(&settings.index.dir));

    let documents = DataProcessor::new().process_file(&args.corpus)
        .with_context(|| format!("reading {}", args.corpus.display()))?;
    if documents.is_empty() {
        bail!("{} contains no projects", args.corpus.display());
    }
    println!("Similarity Indexer\n==================");
    println!("Corpus: {} ({} documents)", args.corpus.display(), documents.len());

    let embedder = embedder_from_settings(&settings.embed)?;
    let index = SimilarityIndex::new(embedder).with_progress();
    let count = documents.len();
    index.build_index(documents)?;
    index.save(&out)?;
    info!(count, out = %out.display(), "index written");

    println!("\n✅ Indexed {} documents into {}", count, out.display());
    println!("💡 Ask a question with: cargo run --bin heritage -- ask '<question>'");
    Ok(())
}
