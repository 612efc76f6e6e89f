use clap::Parser;
use docqa_context::text::{Chunker, ChunkerConfig, DEFAULT_BREAK_PATTERN};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::process;

/// A CLI tool to split a document into overlapping chunks and print them as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Maximum length of each chunk in characters.
    #[arg(short = 's', long, default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[arg(short, long, default_value_t = 200)]
    overlap: usize,

    /// Chunks with this many trimmed characters or fewer are dropped.
    #[arg(short, long, default_value_t = 50)]
    min_chars: usize,

    /// Regex matching the characters a chunk may end on.
    #[arg(short, long, default_value = DEFAULT_BREAK_PATTERN)]
    break_pattern: String,
}

#[derive(Serialize)]
struct SerializableChunk<'a> {
    index: usize,
    source_offset: usize,
    chars: usize,
    text: &'a str,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let content = if let Some(input_path) = args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let config = ChunkerConfig::new(args.chunk_size, args.overlap)
        .with_min_chunk_chars(args.min_chars)
        .with_break_pattern(args.break_pattern);
    let chunks = Chunker::new(config)?.split(&content)?;

    let serializable_chunks: Vec<SerializableChunk> = chunks
        .iter()
        .map(|c| SerializableChunk {
            index: c.index,
            source_offset: c.source_offset,
            chars: c.char_len(),
            text: &c.text,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&serializable_chunks)?);

    Ok(())
}
