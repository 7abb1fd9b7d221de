//! Batch command - fill one template from many documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use docbind_core::{ChatCompletionsBackend, ExtractionOutcome, ExtractionPipeline, Template};

use super::extract::{format_outcome, OutputFormat};
use super::input::{build_pipeline, load_config, load_template, read_document};

/// Extensions picked up from the input pattern.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "doc", "docx", "txt", "xls",
    "xlsx",
];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Template file, or a directory of template files
    #[arg(short, long)]
    template: PathBuf,

    /// Template id when --template is a directory
    #[arg(long)]
    template_id: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Option<ExtractionOutcome>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let template = load_template(&args.template, args.template_id.as_deref())?;
    let pipeline = build_pipeline(&config)?;
    let budget = Duration::from_secs(config.cli.timeout_secs);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process with template '{}'",
        style("ℹ").blue(),
        files.len(),
        template.name
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline, &template, budget).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                if let Some(output_dir) = &args.output_dir {
                    write_output(output_dir, &path, &outcome, &template, args.format)?;
                }
                results.push(ProcessResult {
                    path,
                    outcome: Some(outcome),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        outcome: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let successful = results.len() - failed.len();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results, &template)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    path: &Path,
    pipeline: &ExtractionPipeline<ChatCompletionsBackend>,
    template: &Template,
    budget: Duration,
) -> anyhow::Result<ExtractionOutcome> {
    let payload = read_document(path, None)?;

    match tokio::time::timeout(budget, pipeline.extract(template, &payload)).await {
        Ok(outcome) => Ok(outcome?),
        Err(_) => anyhow::bail!("exceeded {}s time budget", budget.as_secs()),
    }
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    outcome: &ExtractionOutcome,
    template: &Template,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

    fs::write(&output_path, format_outcome(outcome, template, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

/// Write one row per file with the first selected value of every field.
fn write_summary(path: &Path, results: &[ProcessResult], template: &Template) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename".to_string(), "status".to_string()];
    header.extend(template.fields().map(|f| f.name.clone()));
    header.extend(["processing_time_ms".to_string(), "error".to_string()]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &result.outcome {
            Some(outcome) => {
                row.push("success".to_string());
                row.extend(template.fields().map(|f| {
                    outcome
                        .results
                        .get(&f.id)
                        .map(|r| r.selected_values.join(", "))
                        .unwrap_or_default()
                }));
            }
            None => {
                row.push("error".to_string());
                row.extend(template.fields().map(|_| String::new()));
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
