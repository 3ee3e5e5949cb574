//! Reference hoodie image per color.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::color::ColorVariant;

/// Reference images shipped with the binary. None are bundled, so every
/// color starts without a reference until one is configured or uploaded.
pub const DEFAULT_TEMPLATES: [(ColorVariant, Option<&str>); 3] = [
    (ColorVariant::Green, None),
    (ColorVariant::Black, None),
    (ColorVariant::White, None),
];

/// Current reference image (as a data URL) for every color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStore {
    green: Option<String>,
    black: Option<String>,
    white: Option<String>,
}

/// On-disk shape of an exported template map
#[derive(Debug, Default, Serialize, Deserialize)]
struct TemplateSource {
    #[serde(default)]
    templates: BTreeMap<String, String>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        let mut store = Self {
            green: None,
            black: None,
            white: None,
        };
        for (color, data_url) in DEFAULT_TEMPLATES {
            if let Some(data_url) = data_url {
                store.set(color, data_url);
            }
        }
        store
    }
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, color: ColorVariant) -> &Option<String> {
        match color {
            ColorVariant::Green => &self.green,
            ColorVariant::Black => &self.black,
            ColorVariant::White => &self.white,
        }
    }

    fn slot_mut(&mut self, color: ColorVariant) -> &mut Option<String> {
        match color {
            ColorVariant::Green => &mut self.green,
            ColorVariant::Black => &mut self.black,
            ColorVariant::White => &mut self.white,
        }
    }

    /// Reference image for `color`, if any
    pub fn get(&self, color: ColorVariant) -> Option<&str> {
        self.slot(color).as_deref()
    }

    /// Replace the reference image for `color`
    pub fn set(&mut self, color: ColorVariant, data_url: impl Into<String>) {
        *self.slot_mut(color) = Some(data_url.into());
    }

    pub fn clear(&mut self, color: ColorVariant) {
        *self.slot_mut(color) = None;
    }

    /// All colors in declaration order with their reference image
    pub fn iter(&self) -> impl Iterator<Item = (ColorVariant, Option<&str>)> + '_ {
        ColorVariant::all().iter().map(move |c| (*c, self.get(*c)))
    }

    /// Render the current map as a TOML document that [`Self::load_source`] reads back
    pub fn export_source(&self) -> Result<String> {
        let source = TemplateSource {
            templates: self
                .iter()
                .filter_map(|(color, url)| url.map(|u| (color.as_str().to_string(), u.to_string())))
                .collect(),
        };
        toml::to_string_pretty(&source).context("Failed to serialize templates")
    }

    /// Overlay the templates found in an exported TOML document
    pub fn load_source(&mut self, source: &str) -> Result<()> {
        let source: TemplateSource =
            toml::from_str(source).context("Failed to parse templates file")?;
        for (name, data_url) in source.templates {
            let color: ColorVariant = name.parse()?;
            self.set(color, data_url);
        }
        Ok(())
    }
}
