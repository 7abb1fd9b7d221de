//! CLI application for template-driven document field extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, detect, extract, normalize, template};

/// docbind - Extract template fields from images, PDFs, Word text and spreadsheets
#[derive(Parser)]
#[command(name = "docbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract template fields from a single document
    Extract(extract::ExtractArgs),

    /// Extract template fields from multiple documents
    Batch(batch::BatchArgs),

    /// Show the detected document type
    Detect(detect::DetectArgs),

    /// Show the normalized form of a document
    Normalize(normalize::NormalizeArgs),

    /// Inspect and validate templates
    Template(template::TemplateArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Detect(args) => detect::run(args),
        Commands::Normalize(args) => normalize::run(args, cli.config.as_deref()).await,
        Commands::Template(args) => template::run(args),
        Commands::Config(args) => config::run(args),
    }
}
