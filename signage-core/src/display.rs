use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{is_hex_color, DocumentId};

/// A physical screen and everything shown on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The widgets shown on the display, in order
    #[serde(default)]
    pub widgets: Vec<DocumentId>,
    #[serde(default)]
    pub layout: LayoutStyle,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub status_bar: StatusBar,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

/// How tightly widgets are packed on the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    #[default]
    Spaced,
    Compact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// The strip along the edge of a display showing time, date, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBar {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub color: Option<String>,
    /// Element identifiers, in display order
    #[serde(default)]
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusBarError {
    #[error("Status bar color must be a hex color like #1a2b3c, got {0}")]
    InvalidColor(String),
    #[error("Status bar can't have more than {max} elements")]
    TooManyElements { max: usize },
    #[error("Status bar elements can't be empty")]
    EmptyElement,
}

impl StatusBar {
    pub const MAX_ELEMENTS: usize = 16;

    pub fn validate(&self) -> Result<(), StatusBarError> {
        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(StatusBarError::InvalidColor(color.clone()));
            }
        }

        if self.elements.len() > Self::MAX_ELEMENTS {
            return Err(StatusBarError::TooManyElements {
                max: Self::MAX_ELEMENTS,
            });
        }

        if self.elements.iter().any(|e| e.trim().is_empty()) {
            return Err(StatusBarError::EmptyElement);
        }

        Ok(())
    }
}
