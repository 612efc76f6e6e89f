use clap::{Parser, Subcommand};
use docqa_context::Chunker;
use docqa_embed::ProviderKind;
use docqa_retriever::{
    DocumentSource, FileDocumentSource, QueryResult, RetrievalService, RetrieverConfig,
    format_passages,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

/// Query a reference document by semantic similarity.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Document to index; overrides `document_path` from the configuration
    #[arg(short, long, global = true)]
    document: Option<PathBuf>,

    /// Embedding provider (hashing, fastembed, http); overrides the configuration
    #[arg(short, long, global = true)]
    provider: Option<ProviderKind>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how the document is split into chunks
    Chunks {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Rank passages for a query; failures are reported
    Search {
        /// The question or search text
        query: String,
        /// Maximum number of passages
        #[arg(short = 'k', long)]
        limit: Option<usize>,
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Print grounding context for a user message; prints nothing on failure
    Sections {
        /// The user message
        message: String,
        /// Maximum number of passages
        #[arg(short = 'k', long)]
        limit: Option<usize>,
    },
    /// Build the index and show its status
    Status {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[derive(Serialize)]
struct ChunkOutput {
    index: usize,
    source_offset: usize,
    chars: usize,
    text: String,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [QueryResult],
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &Args) -> anyhow::Result<RetrieverConfig> {
    let mut config = match &args.config {
        Some(path) => RetrieverConfig::load(path)?,
        None => RetrieverConfig::default(),
    };
    if let Some(document) = &args.document {
        config = config.with_document_path(document);
    }
    if let Some(provider) = args.provider {
        config.embedding.provider = provider;
    }
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;

    match args.command {
        Commands::Chunks { format } => {
            let path = config
                .document_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("no document given; use --document"))?;
            let text = FileDocumentSource::new().extract_text(path).await?;
            let chunks = Chunker::new(config.chunking.clone())?.split(&text)?;

            match format {
                OutputFormat::Json => {
                    let output: Vec<ChunkOutput> = chunks
                        .iter()
                        .map(|chunk| ChunkOutput {
                            index: chunk.index,
                            source_offset: chunk.source_offset,
                            chars: chunk.char_len(),
                            text: chunk.text.clone(),
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Summary => {
                    println!("{} chunks from {}", chunks.len(), path.display());
                    for chunk in &chunks {
                        println!(
                            "#{:<4} offset {:<8} {:>5} chars  {}",
                            chunk.index,
                            chunk.source_offset,
                            chunk.char_len(),
                            chunk.preview(60)
                        );
                    }
                }
            }
            Ok(())
        }
        Commands::Search {
            query,
            limit,
            format,
        } => {
            let service = RetrievalService::from_config(config).await?;
            let k = limit.unwrap_or_else(|| service.default_k());
            let results = service.query(&query, k).await?;

            match format {
                OutputFormat::Json => {
                    let output = SearchOutput {
                        query: &query,
                        results: &results,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Summary => {
                    if results.is_empty() {
                        println!("No passages found");
                    } else {
                        println!("{}", format_passages(&results));
                    }
                }
            }
            Ok(())
        }
        Commands::Sections { message, limit } => {
            let service = RetrievalService::from_config(config).await?;
            let k = limit.unwrap_or_else(|| service.default_k());
            let sections = service.get_relevant_sections(&message, k).await;
            if !sections.is_empty() {
                println!("{sections}");
            }
            Ok(())
        }
        Commands::Status { format } => {
            let service = RetrievalService::from_config(config).await?;
            if let Err(e) = service.initialize().await {
                tracing::warn!("Index build failed: {}", e);
            }
            let status = service.status().await;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
                OutputFormat::Summary => println!("{status}"),
            }
            Ok(())
        }
    }
}
