use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::GeminiClient;
use crate::config::{Config, DisplayMode};
use crate::core::output::{new_portrait_id, save_portrait};
use crate::core::{AppState, ColorVariant, PortraitGenerator, UploadedImage};

#[derive(Args)]
pub struct PortraitArgs {
    /// Path to the portrait photo
    #[arg(required = true)]
    pub photo: PathBuf,

    /// Hoodie color (green, black, white)
    #[arg(short, long)]
    pub color: Option<ColorVariant>,

    /// Additional adjustments appended to the instructions
    #[arg(short, long)]
    pub adjust: Option<String>,

    /// Reference hoodie image for this run (overrides the configured template)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Exported templates file to load on top of the configured templates
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory for the portrait
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't write the portrait to disk
    #[arg(long)]
    pub no_save: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// JSON summary of one run
#[derive(Debug, Serialize)]
struct PortraitSummary {
    id: String,
    status: &'static str,
    photo: String,
    color: ColorVariant,
    model: String,
    with_reference: bool,
    adjustment: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: PortraitArgs, config: &Config) -> Result<()> {
    let mut state = prepare_state(&args, config).await?;
    let request = state.begin_generation()?;

    let generator = PortraitGenerator::new(GeminiClient::from_config(config)?)
        .with_model(args.model.as_deref().unwrap_or(&config.api.model));

    let mut summary = PortraitSummary {
        id: new_portrait_id(),
        status: "running",
        photo: args.photo.display().to_string(),
        color: request.color,
        model: generator.model().to_string(),
        with_reference: request.reference.is_some(),
        adjustment: request.adjustment.clone(),
        created_at: Utc::now(),
        path: None,
        image: None,
        error: None,
    };

    // Show progress
    let pb = if args.format == "text" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Generating {} hoodie portrait...", request.color.as_str()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = generator
        .generate(
            &request.subject,
            request.reference.as_deref(),
            request.color,
            &request.adjustment,
        )
        .await;
    state.finish_generation(&result);

    let image = match result {
        Ok(image) => image,
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_with_message(format!("{} Generation failed", "✗".red()));
            }

            summary.status = "failed";
            summary.error = state.generation.error.clone();
            if let Some(report) = failure_report(&args.format, &summary)? {
                println!("{}", report);
            }
            return Err(e.into());
        }
    };

    summary.status = "completed";

    if args.no_save {
        if let Some(pb) = &pb {
            pb.finish_with_message(format!("{} Portrait generated (not saved)", "✓".green()));
        }
        match args.format.as_str() {
            "json" => {
                summary.image = Some(image);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            "quiet" => println!("{}", image),
            _ => print_details(&summary),
        }
        return Ok(());
    }

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let path = save_portrait(&image, &output_dir, &summary.id, request.color, summary.created_at).await?;
    summary.path = Some(path.display().to_string());

    if let Some(pb) = &pb {
        pb.finish_with_message(format!("{} Portrait saved", "✓".green()));
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "quiet" => println!("{}", path.display()),
        _ => {
            print_details(&summary);
            if config.output.display == DisplayMode::Terminal {
                println!();
                display_image_terminal(&path);
            }
        }
    }

    Ok(())
}

/// Assemble the page state from config, flags and the photo
async fn prepare_state(args: &PortraitArgs, config: &Config) -> Result<AppState> {
    let mut templates = config.template_store().await;

    if let Some(file) = &args.templates {
        let source = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read templates file: {}", file.display()))?;
        templates.load_source(&source)?;
    }

    let mut state = AppState::new(templates);
    state.select_color(args.color.unwrap_or(config.defaults.color));
    state.set_adjustment(
        args.adjust
            .clone()
            .unwrap_or_else(|| config.defaults.adjustment.clone()),
    );

    if let Some(reference) = &args.reference {
        let reference = UploadedImage::load(reference)
            .await
            .context("Failed to load reference image")?;
        state.replace_template(state.color, reference.data_url);
    }

    let photo = UploadedImage::load(&args.photo)
        .await
        .context("Failed to load photo")?;
    state.upload(photo);

    Ok(state)
}

/// What to print on stdout for a failed run. The error itself is reported once, by `main`.
fn failure_report(format: &str, summary: &PortraitSummary) -> Result<Option<String>> {
    match format {
        "json" => Ok(Some(serde_json::to_string_pretty(summary)?)),
        _ => Ok(None),
    }
}

fn print_details(summary: &PortraitSummary) {
    println!();
    println!("{}: {}", "Portrait ID".cyan().bold(), summary.id);
    println!("{}: {}", "Photo".cyan().bold(), summary.photo);
    println!("{}: {}", "Color".cyan().bold(), summary.color);
    println!(
        "{}: {}",
        "Reference".cyan().bold(),
        if summary.with_reference { "yes" } else { "none" }
    );
    if !summary.adjustment.is_empty() {
        println!("{}: {}", "Adjustments".cyan().bold(), summary.adjustment);
    }
    println!("{}: {}", "Model".cyan().bold(), summary.model);
    println!("{}: {}", "Status".cyan().bold(), "completed".green());
    if let Some(path) = &summary.path {
        println!();
        println!("{}:", "Portrait".cyan().bold());
        println!("  {}", path);
    }
}

/// Display an image in the terminal using viuer
pub fn display_image_terminal(path: &Path) {
    let conf = viuer::Config {
        width: Some(60),
        height: Some(30),
        absolute_offset: false,
        ..Default::default()
    };

    if let Err(e) = viuer::print_from_file(path, &conf) {
        tracing::debug!("Failed to display image in terminal: {}", e);
    }
}
