pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoodie",
    version,
    about = "Branded hoodie portraits from a photo, powered by Google Gemini",
    long_about = r#"Branded hoodie portraits from a photo, powered by Google Gemini

Upload a portrait photo, pick a hoodie color and get back a waist-up,
LinkedIn-style portrait of the same person wearing the branded hoodie.
Run without arguments to launch the interactive TUI.

SETUP:
  Set your API key via environment variable or config:
    export GEMINI_API_KEY=your-key-here
    hoodie config set api.key your-key-here

EXAMPLES:
  Generate a portrait:
    hoodie portrait me.jpg
    hoodie p me.jpg --color black
    hoodie portrait me.jpg --color white --adjust "brighter lighting"

  Use a reference hoodie image:
    hoodie portrait me.jpg --color green --reference green-hoodie.png
    hoodie templates set green green-hoodie.png

  Manage configuration:
    hoodie config show
    hoodie config set defaults.color black

  Launch interactive TUI:
    hoodie

OUTPUT FORMATS:
  --format text   Human-readable output (default)
  --format json   Machine-readable JSON
  --format quiet  Minimal output, just the file path"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/hoodie/config.toml (Linux)

  Colors: green (default), black, white
  Models:
    - gemini-2.5-flash-image (default)
    - gemini-3-pro-image-preview"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a branded hoodie portrait from a photo
    ///
    /// Sends the photo, the reference hoodie image for the chosen color (if
    /// one is configured) and the branding instructions to Gemini, then saves
    /// the returned portrait to the output directory.
    #[command(
        alias = "p",
        after_help = r#"EXAMPLES:
  Default color:
    hoodie portrait me.jpg

  Pick a color and tweak the result:
    hoodie portrait me.jpg --color black --adjust "smile, warmer tones"

  One-off reference image:
    hoodie portrait me.jpg --reference black-hoodie.png --color black

  JSON output:
    hoodie portrait me.jpg --format json"#
    )]
    Portrait(commands::portrait::PortraitArgs),

    /// Manage the reference hoodie image for each color
    #[command(
        alias = "t",
        after_help = r#"EXAMPLES:
  Show configured templates:
    hoodie templates list

  Assign a reference image:
    hoodie templates set green ./refs/green.png

  Remove one:
    hoodie templates clear green

  Export the current map (data URLs) as TOML:
    hoodie templates export --output templates.toml"#
    )]
    Templates(commands::templates::TemplatesArgs),

    /// View or modify configuration
    ///
    /// Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    hoodie config show

  Get a specific value:
    hoodie config get defaults.color

  Set values:
    hoodie config set api.key YOUR_API_KEY
    hoodie config set defaults.color white
    hoodie config set output.directory ~/Pictures/hoodie

  Reset to defaults:
    hoodie config reset --force

AVAILABLE SETTINGS:
  api.key              - Gemini API key
  api.model            - Image model
  api.base_url         - API endpoint
  defaults.color       - Hoodie color (green, black, white)
  defaults.adjustment  - Extra instructions appended to every prompt
  output.directory     - Where to save portraits
  output.display       - Display mode (terminal/none)
  templates.<color>    - Reference hoodie image file for a color"#
    )]
    Config(commands::config::ConfigArgs),
}
