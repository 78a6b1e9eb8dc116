use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pdfchat::{
    build_context, build_pipeline, build_retrieval_pipeline, extractor_for_path, logging,
    PipelineArgs, ProviderArgs, RetrievalPipeline, SearchHit, TextExtractor,
};

#[derive(Parser, Debug)]
#[command(
    name = "pdfchat-ask",
    about = "Ingest a local PDF or text file and answer questions about it"
)]
struct AskCli {
    /// Document to ingest (.pdf, or .txt/.md for plain text)
    #[arg(long)]
    file: PathBuf,

    /// Question to answer; reads one question per line from stdin when omitted
    #[arg(long)]
    question: Option<String>,

    /// Only print the retrieved context (skip the answer model)
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "PDFCHAT_LOG", default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(flatten)]
    providers: ProviderArgs,
}

fn main() -> Result<()> {
    let cli = AskCli::parse();
    logging::init(&cli.log_level);

    let extractor: Arc<dyn TextExtractor> = Arc::from(extractor_for_path(&cli.file));
    let pipeline = if cli.dry_run {
        build_retrieval_pipeline(&cli.pipeline, &cli.providers, extractor)?
    } else {
        build_pipeline(&cli.pipeline, &cli.providers, extractor)?
    };
    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let chunks = pipeline
        .ingest(&bytes)
        .with_context(|| format!("failed to ingest {}", cli.file.display()))?;
    eprintln!("ingested {} ({chunks} chunks)", cli.file.display());

    if let Some(question) = &cli.question {
        return respond(&pipeline, question, cli.dry_run);
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read question from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        respond(&pipeline, &line, cli.dry_run)?;
        io::stdout().flush().context("failed to flush stdout")?;
    }
    Ok(())
}

fn respond(pipeline: &RetrievalPipeline, question: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        let hits = pipeline.retrieve(question)?;
        println!("--- Retrieved Context ---\n{}\n", render_hits(&hits));
        println!("dry-run enabled; skipping LLM call.");
        return Ok(());
    }
    let answer = pipeline.answer(question)?;
    println!("--- Answer ---\n{answer}");
    Ok(())
}

fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return String::from("(no chunks retrieved)");
    }
    let labelled: Vec<String> = hits
        .iter()
        .map(|hit| {
            format!(
                "Chunk {} | distance {:.4}\n{}",
                hit.chunk_index,
                hit.distance,
                hit.text.trim()
            )
        })
        .collect();
    build_context(&labelled)
}
