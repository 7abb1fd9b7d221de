//! Normalize command - show the canonical form of a document.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use docbind_core::document::{normalize_excel, normalize_word};
use docbind_core::{detect, DocumentType, ParsedDocument};

use super::input::{build_pipeline, load_config, read_document};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Input document
    #[arg(required = true)]
    input: PathBuf,

    /// Declared media type (or one of image, pdf, word, excel)
    #[arg(short, long)]
    media_type: Option<String>,

    /// Print only the text instead of the full JSON document
    #[arg(long)]
    text: bool,
}

pub async fn run(args: NormalizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let payload = read_document(&args.input, args.media_type.as_deref())?;
    let doc_type = detect(&payload.media_type, payload.file_name.as_deref());
    info!("Normalizing {} as {}", args.input.display(), doc_type);

    // Word and spreadsheet input never needs the model service.
    let parsed: ParsedDocument = match doc_type {
        DocumentType::Word => normalize_word(&payload.content)?,
        DocumentType::Excel => normalize_excel(&payload.content)?,
        DocumentType::Image | DocumentType::Pdf => {
            let config = load_config(config_path)?;
            build_pipeline(&config)?.normalize(&payload).await?
        }
    };

    if args.text {
        println!("{}", parsed.raw_text());
    } else {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    }

    Ok(())
}
