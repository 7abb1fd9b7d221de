//! Detect command - show how a document would be classified.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use docbind_core::detect;

use super::input::guess_media_type;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input documents
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Declared media type (or one of image, pdf, word, excel)
    #[arg(short, long)]
    media_type: Option<String>,
}

pub fn run(args: DetectArgs) -> anyhow::Result<()> {
    for path in &args.files {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        let media_type = match &args.media_type {
            Some(media_type) => media_type.clone(),
            None => guess_media_type(&fs::read(path)?, path),
        };
        let file_name = path.file_name().and_then(|n| n.to_str());
        let doc_type = detect(&media_type, file_name);

        println!(
            "{}: {} ({})",
            path.display(),
            style(doc_type).cyan(),
            media_type
        );
    }

    Ok(())
}
