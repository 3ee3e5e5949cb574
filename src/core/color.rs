use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PortraitError;

/// Hoodie color offered for the branded portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorVariant {
    #[default]
    Green,
    Black,
    White,
}

impl ColorVariant {
    pub fn all() -> &'static [ColorVariant] {
        &[ColorVariant::Green, ColorVariant::Black, ColorVariant::White]
    }

    /// Display name ("Green")
    pub fn label(&self) -> &'static str {
        match self {
            ColorVariant::Green => "Green",
            ColorVariant::Black => "Black",
            ColorVariant::White => "White",
        }
    }

    /// Lowercase name used in prompts and config keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorVariant::Green => "green",
            ColorVariant::Black => "black",
            ColorVariant::White => "white",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorVariant::Green => ColorVariant::Black,
            ColorVariant::Black => ColorVariant::White,
            ColorVariant::White => ColorVariant::Green,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ColorVariant::Green => ColorVariant::White,
            ColorVariant::Black => ColorVariant::Green,
            ColorVariant::White => ColorVariant::Black,
        }
    }
}

impl fmt::Display for ColorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ColorVariant {
    type Err = PortraitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(ColorVariant::Green),
            "black" => Ok(ColorVariant::Black),
            "white" => Ok(ColorVariant::White),
            _ => Err(PortraitError::UnknownColor(s.to_string())),
        }
    }
}
