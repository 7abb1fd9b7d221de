//! Template command - validate, inspect and import templates.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use docbind_core::Template;

use super::input::read_template;

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Check a template for problems
    Validate {
        /// Template file
        file: PathBuf,
    },

    /// Show the sections and fields of a template
    Show {
        /// Template file
        file: PathBuf,
    },

    /// Import a template under a fresh id
    Import {
        /// Template file
        file: PathBuf,

        /// Where to write the imported template (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: TemplateArgs) -> anyhow::Result<()> {
    match args.command {
        TemplateCommand::Validate { file } => validate_template(&file),
        TemplateCommand::Show { file } => show_template(&file),
        TemplateCommand::Import { file, output } => import_template(&file, output),
    }
}

fn validate_template(file: &Path) -> anyhow::Result<()> {
    let template = read_template(file)?;
    let issues = template.validate();

    if issues.is_empty() {
        println!(
            "{} '{}' is valid ({} fields)",
            style("✓").green(),
            template.name,
            template.field_count()
        );
        return Ok(());
    }

    for issue in &issues {
        println!("{} {}", style("✗").red(), issue);
    }
    anyhow::bail!("{} problem(s) found in {}", issues.len(), file.display())
}

fn show_template(file: &Path) -> anyhow::Result<()> {
    let template = read_template(file)?;
    print!("{}", describe(&template));
    Ok(())
}

fn import_template(file: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let template = Template::import(&fs::read_to_string(file)?)?;
    let json = serde_json::to_string_pretty(&template)?;

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!(
                "{} Imported '{}' as {} into {}",
                style("✓").green(),
                template.name,
                template.id,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn describe(template: &Template) -> String {
    let mut output = format!("{} [{}]\n", template.name, template.id);
    if let Some(description) = &template.description {
        output.push_str(&format!("{}\n", description));
    }

    for section in &template.sections {
        output.push_str(&format!("\n{}:\n", section.name));
        for field in &section.fields {
            let mut line = format!(
                "  {} ({}, {})",
                field.name,
                field.kind.description(),
                field.extraction.method.name()
            );
            if field.required {
                line.push_str(" *");
            }
            if field.accepts_multiple() {
                line.push_str(" [multi]");
            }
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}
