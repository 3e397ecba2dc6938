//! `bloodwise` command-line front end.
//!
//! # Environment Variables
//! - `GROQ_API_KEY`: API key for the chat completions endpoint (required by `analyze`)
//! - `RUST_LOG`: log filter (default: `bloodwise=info`), logs go to stderr

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context};
use bloodwise_core::models::ValueMap;
use bloodwise_core::{classify, AnalysisReport, Database, RiskMap, TextSplitter};
use bloodwise_llm::{
    fragments, GroqClient, GroqConfig, PipelineConfig, PipelineError, ReportPipeline,
    RetryingCompletor,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "bloodwise")]
#[command(about = "Blood report value extraction and risk summary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract values from a plain-text report, classify risks and describe them
    Analyze {
        /// Plain-text report
        report: PathBuf,
        /// Pipeline config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Segment store path (in-memory when omitted)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Write the analysis as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the analysis as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print the narrative at once instead of in paced fragments
        #[arg(long)]
        no_stream: bool,
        /// Extraction threads
        #[arg(long, default_value_t = 1)]
        workers: usize,
    },
    /// Classify a saved value map (JSON object of parameter to value)
    Classify {
        /// Value map file
        values: PathBuf,
        /// Print the risk map as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("bloodwise=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            report,
            config,
            db,
            json,
            csv,
            no_stream,
            workers,
        } => analyze(AnalyzeArgs {
            report,
            config,
            db,
            json,
            csv,
            stream: !no_stream,
            workers,
        }),
        Commands::Classify { values, json } => classify_file(&values, json),
    }
}

struct AnalyzeArgs {
    report: PathBuf,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    stream: bool,
    workers: usize,
}

fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let api_key = std::env::var("GROQ_API_KEY").context("GROQ_API_KEY is not set")?;
    let client = GroqClient::new(GroqConfig::new(api_key, &config.completion))
        .context("creating completion client")?;
    let completor = RetryingCompletor::new(client, config.retry.clone());

    let text = std::fs::read_to_string(&args.report)
        .with_context(|| format!("reading report {}", args.report.display()))?;
    let chunks = TextSplitter::default().split(&text);
    if chunks.is_empty() {
        bail!("report {} has no text", args.report.display());
    }

    let db = match &args.db {
        Some(path) => Database::open(path).with_context(|| format!("opening store {}", path.display()))?,
        None => Database::open_in_memory().context("opening in-memory store")?,
    };
    let title = args.report.file_name().map(|n| n.to_string_lossy().into_owned());
    let document = db
        .insert_document(title.as_deref(), &chunks)
        .context("storing report segments")?;
    tracing::info!(document_id = %document.document_id, segments = document.segment_count, "report ingested");

    let retriever = Mutex::new(
        db.into_retriever(document.document_id.as_str())
            .with_limit(config.retrieval_limit),
    );
    let pipeline = ReportPipeline::new(&config).with_workers(args.workers);

    let outcome = match pipeline.run(&retriever, &completor) {
        Ok(outcome) => outcome,
        Err(PipelineError::Extraction(e)) => {
            if !e.partial().is_empty() {
                print_values(e.partial());
            }
            return Err(e).context("extracting values");
        }
        Err(PipelineError::Narrative { values, risks, source }) => {
            print_values(&values);
            print_risks(&risks);
            return Err(source).context("generating narrative");
        }
    };

    print_values(&outcome.values);
    print_risks(&outcome.risks);

    println!("Summary");
    if args.stream {
        let mut stdout = std::io::stdout().lock();
        for fragment in fragments(&outcome.narrative, &config.streaming) {
            stdout.write_all(fragment.as_bytes())?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
    } else {
        println!("{}", outcome.narrative);
    }

    let export = AnalysisReport::new(&outcome.values, &outcome.risks)
        .with_document(&document)
        .with_narrative(outcome.narrative.as_str());
    if let Some(path) = &args.json {
        write_file(path, &export.to_json()?)?;
    }
    if let Some(path) = &args.csv {
        write_file(path, &export.to_csv())?;
    }

    Ok(())
}

fn classify_file(path: &Path, as_json: bool) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let values: ValueMap =
        serde_json::from_str(&json).with_context(|| format!("parsing value map {}", path.display()))?;

    let risks = classify(&values);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&risks)?);
    } else {
        print_risks(&risks);
    }
    Ok(())
}

fn print_values(values: &ValueMap) {
    println!("{:<24} Value", "Parameter");
    for (parameter, value) in values.iter() {
        println!("{:<24} {}", parameter, value);
    }
    println!();
}

fn print_risks(risks: &RiskMap) {
    println!("{:<36} Risk Level", "Condition");
    for (condition, level) in risks.iter() {
        println!("{:<36} {}", condition, level);
    }
    println!();
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "analysis exported");
    Ok(())
}
