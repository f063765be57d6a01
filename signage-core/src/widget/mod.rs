mod data;

pub use data::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DocumentId;

/// A widget's cell on the display grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: 1,
            h: 1,
        }
    }
}

/// A typed, positioned block of content on a display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WidgetDocument", into = "WidgetDocument")]
pub struct Widget {
    pub id: DocumentId,
    pub name: String,
    pub data: WidgetData,
    pub position: Position,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl Widget {
    pub fn kind(&self) -> WidgetType {
        self.data.kind()
    }
}

/// The stored shape of a [Widget], with the payload kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WidgetType,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "one")]
    pub w: u32,
    #[serde(default = "one")]
    pub h: u32,
    #[serde(default)]
    pub data: Value,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

fn one() -> u32 {
    1
}

impl TryFrom<WidgetDocument> for Widget {
    type Error = WidgetDataError;

    fn try_from(document: WidgetDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document.id,
            name: document.name,
            data: WidgetData::from_parts(document.kind, document.data)?,
            position: Position {
                x: document.x,
                y: document.y,
                w: document.w,
                h: document.h,
            },
            creator_id: document.creator_id,
            creation_date: document.creation_date,
            last_update: document.last_update,
        })
    }
}

impl From<Widget> for WidgetDocument {
    fn from(widget: Widget) -> Self {
        Self {
            id: widget.id,
            name: widget.name,
            kind: widget.data.kind(),
            x: widget.position.x,
            y: widget.position.y,
            w: widget.position.w,
            h: widget.position.h,
            data: widget.data.to_value(),
            creator_id: widget.creator_id,
            creation_date: widget.creation_date,
            last_update: widget.last_update,
        }
    }
}
