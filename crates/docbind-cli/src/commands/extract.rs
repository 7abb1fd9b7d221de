//! Extract command - fill a template from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docbind_core::{ExtractionMode, ExtractionOutcome, Template};

use super::input::{build_pipeline, load_config, load_ocr, load_template, read_document};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document
    #[arg(required = true)]
    input: PathBuf,

    /// Template file, or a directory of template files
    #[arg(short, long)]
    template: PathBuf,

    /// Template id when --template is a directory
    #[arg(long)]
    template_id: Option<String>,

    /// Declared media type (or one of image, pdf, word, excel)
    #[arg(short, long)]
    media_type: Option<String>,

    /// Word-level OCR result (JSON) for position and keyword fields
    #[arg(long)]
    ocr: Option<PathBuf>,

    /// Extraction mode (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Mode {
    /// One binding call for all fields
    Batch,
    /// Each field uses its own extraction method
    PerField,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batch => ExtractionMode::Batch,
            Mode::PerField => ExtractionMode::PerField,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per field
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(mode) = args.mode {
        config.extraction.mode = mode.into();
    }

    let template = load_template(&args.template, args.template_id.as_deref())?;
    let payload = read_document(&args.input, args.media_type.as_deref())?;
    let ocr = args.ocr.as_deref().map(load_ocr).transpose()?;
    let pipeline = build_pipeline(&config)?;

    info!(
        "Extracting '{}' ({} fields) from {}",
        template.name,
        template.field_count(),
        args.input.display()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Extracting fields...");

    let budget = Duration::from_secs(config.cli.timeout_secs);
    let outcome = tokio::time::timeout(
        budget,
        pipeline.extract_with_ocr(&template, &payload, ocr.as_ref()),
    )
    .await;

    pb.finish_and_clear();

    let outcome = match outcome {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("Extraction exceeded {}s time budget", budget.as_secs()),
    };

    for warning in &outcome.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_outcome(&outcome, &template, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {}ms", outcome.processing_time_ms);
    Ok(())
}

/// Render an outcome in the requested format.
pub fn format_outcome(
    outcome: &ExtractionOutcome,
    template: &Template,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => format_csv(outcome, template),
        OutputFormat::Text => Ok(format_text(outcome, template)),
    }
}

fn format_csv(outcome: &ExtractionOutcome, template: &Template) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "field_id",
        "field_name",
        "selected_values",
        "best_confidence",
        "candidates",
    ])?;

    for field in template.fields() {
        let Some(result) = outcome.results.get(&field.id) else {
            continue;
        };
        wtr.write_record([
            &result.field_id,
            &result.field_name,
            &result.selected_values.join(", "),
            &result
                .best()
                .map(|c| format!("{:.2}", c.confidence))
                .unwrap_or_default(),
            &result.candidates.len().to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcome: &ExtractionOutcome, template: &Template) -> String {
    let mut output = String::new();

    output.push_str(&format!("Template: {}\n", template.name));
    output.push_str(&format!("Document: {}\n", outcome.document_type));
    output.push('\n');

    for section in &template.sections {
        output.push_str(&format!("{}:\n", section.name));
        for field in &section.fields {
            let Some(result) = outcome.results.get(&field.id) else {
                continue;
            };
            let value = if result.selected_values.is_empty() {
                "-".to_string()
            } else {
                result.selected_values.join(", ")
            };
            output.push_str(&format!("  {}: {}\n", field.name, value));

            for candidate in result.candidates.iter().skip(1) {
                output.push_str(&format!(
                    "      alt {} ({:.2})\n",
                    candidate.value, candidate.confidence
                ));
            }
        }
        output.push('\n');
    }

    output.push_str(&format!("Processing time: {}ms\n", outcome.processing_time_ms));
    output
}
