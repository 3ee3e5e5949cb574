use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;
use crate::core::ColorVariant;

#[derive(Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: Option<TemplatesCommand>,
}

#[derive(Subcommand)]
pub enum TemplatesCommand {
    /// Show the reference image configured for each color
    List,

    /// Use an image file as the reference hoodie for a color
    Set {
        /// Hoodie color (green, black, white)
        color: ColorVariant,
        /// Reference image file
        path: PathBuf,
    },

    /// Remove the reference image for a color
    Clear {
        /// Hoodie color (green, black, white)
        color: ColorVariant,
    },

    /// Print the current template map (as data URLs) in TOML
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(args: TemplatesArgs, config: &mut Config) -> Result<()> {
    match args.command {
        Some(TemplatesCommand::List) | None => list_templates(config),
        Some(TemplatesCommand::Set { color, path }) => set_template(color, path, config),
        Some(TemplatesCommand::Clear { color }) => clear_template(color, config),
        Some(TemplatesCommand::Export { output }) => export_templates(output, config).await,
    }
}

fn list_templates(config: &Config) -> Result<()> {
    println!("{}", "Hoodie Templates".cyan().bold());
    println!("{}", "=".repeat(50));
    for color in ColorVariant::all() {
        let value = match config.templates.path(*color) {
            Some(path) => path.to_string(),
            None => "(no image)".dimmed().to_string(),
        };
        println!("  {:<8} {}", color.label().bold(), value);
    }
    Ok(())
}

fn set_template(color: ColorVariant, path: PathBuf, config: &mut Config) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Template image not found: {}", path.display()))?;
    config
        .templates
        .set_path(color, Some(path.display().to_string()));
    config.save()?;

    println!("{} {} template = {}", "✓".green(), color.label().cyan(), path.display());
    Ok(())
}

fn clear_template(color: ColorVariant, config: &mut Config) -> Result<()> {
    config.templates.set_path(color, None);
    config.save()?;

    println!("{} Cleared {} template", "✓".green(), color.label().cyan());
    Ok(())
}

async fn export_templates(output: Option<PathBuf>, config: &Config) -> Result<()> {
    let source = config.template_store().await.export_source()?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, source)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Exported templates to {}", "✓".green(), path.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}
