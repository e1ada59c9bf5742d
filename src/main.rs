use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustyingest::{
    config::{self, Config},
    extraction, logging,
    processing::{
        ChunkParams, ProcessingService, ProcessingSettings, Upload, extract_and_chunk,
        validate::PDF_MIME_TYPE,
    },
    store::{DocumentStore, MemoryStore},
};
use serde_json::json;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "rustyingest",
    about = "Recover text from PDFs and split it into retrieval chunks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the text recovered from a PDF.
    Extract { file: PathBuf },
    /// Print the chunks of a PDF as JSON lines.
    Chunk {
        file: PathBuf,
        #[command(flatten)]
        chunking: ChunkArgs,
    },
    /// Run PDF files and directories through the full ingestion pipeline.
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        chunking: ChunkArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct ChunkArgs {
    /// Maximum characters per chunk (defaults to `CHUNK_SIZE`).
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Characters carried over between chunks (defaults to `CHUNK_OVERLAP`).
    #[arg(long)]
    overlap: Option<usize>,
}

impl ChunkArgs {
    fn resolve(self, config: &Config) -> Result<ChunkParams> {
        let max_size = self
            .chunk_size
            .unwrap_or_else(|| config.chunk_params.max_size());
        let overlap = self
            .overlap
            .unwrap_or_else(|| config.chunk_params.overlap());
        ChunkParams::new(max_size, overlap).context("invalid chunking arguments")
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing(config.log_file.as_deref());
    tracing::debug!(
        chunk_size = config.chunk_params.max_size(),
        chunk_overlap = config.chunk_params.overlap(),
        max_upload_bytes = config.max_upload_bytes,
        log_file = ?config.log_file,
        "Loaded configuration"
    );
    extraction::init().context("failed to initialize PDF extractor")?;

    match cli.command {
        Command::Extract { file } => extract(&file),
        Command::Chunk { file, chunking } => chunk(&file, chunking.resolve(config)?),
        Command::Ingest { paths, chunking } => {
            let settings = ProcessingSettings {
                chunk_params: chunking.resolve(config)?,
                max_upload_bytes: config.max_upload_bytes,
            };
            ingest(&paths, settings).await
        }
    }
}

fn extract(file: &Path) -> Result<()> {
    let bytes = read_file(file)?;
    let extracted = extraction::extract_text(&bytes);
    tracing::info!(file = %file.display(), source = ?extracted.source(), "Extracted text");
    println!("{extracted}");
    Ok(())
}

fn chunk(file: &Path, params: ChunkParams) -> Result<()> {
    let bytes = read_file(file)?;
    let (source, chunks) = extract_and_chunk(&bytes, params);
    tracing::info!(
        file = %file.display(),
        source = ?source,
        chunks = chunks.len(),
        "Chunked document"
    );

    let mut out = io::stdout().lock();
    for chunk in &chunks {
        serde_json::to_writer(&mut out, chunk)?;
        writeln!(out)?;
    }
    Ok(())
}

async fn ingest(paths: &[PathBuf], settings: ProcessingSettings) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let service = ProcessingService::new(store.clone(), settings);

    let mut submissions = Vec::new();
    for file in collect_pdf_files(paths)? {
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let upload = Upload {
            mime_type: mime_type_for(&file).to_string(),
            bytes: read_file(&file)?,
            filename: filename.clone(),
            title: None,
        };
        match service.submit(upload).await {
            Ok(submission) => submissions.push(submission),
            Err(error) => {
                tracing::warn!(file = %file.display(), error = %error, "Upload rejected");
                print_line(&json!({ "filename": filename, "error": error.to_string() }))?;
            }
        }
    }

    for submission in submissions {
        let outcome = submission.task.await.context("processing task panicked")?;
        let document = store.get_document(submission.document.id).await?;
        let summary = match outcome {
            Ok(outcome) => json!({ "document": document, "source": outcome.source }),
            Err(error) => json!({ "document": document, "error": error.to_string() }),
        };
        print_line(&summary)?;
    }

    print_line(&json!({ "metrics": service.metrics_snapshot() }))
}

/// Write one JSON line, holding the stdout lock only for the write itself.
fn print_line(value: &serde_json::Value) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{value}")?;
    Ok(())
}

/// Expand directories into the PDF files they contain; explicit file paths are kept as given.
fn collect_pdf_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn mime_type_for(path: &Path) -> &'static str {
    if has_pdf_extension(path) {
        PDF_MIME_TYPE
    } else {
        "application/octet-stream"
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
