use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DocumentId, Position, StatusBar};

/// A reusable arrangement of widgets that displays can be created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub status_bar: StatusBar,
    #[serde(default)]
    pub widgets: Vec<LayoutPlacement>,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    /// Horizontal and vertical gap between cells, in pixels
    pub margin: [u32; 2],
    pub row_height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 6,
            rows: 4,
            margin: [12, 12],
            row_height: 200,
        }
    }
}

/// A widget placed on a layout's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPlacement {
    pub widget_id: DocumentId,
    #[serde(flatten)]
    pub position: Position,
}

impl GridConfig {
    /// Returns true if the position lies fully within the grid's columns.
    /// Rows are not bounded since grids grow downwards.
    pub fn fits(&self, position: &Position) -> bool {
        position.w > 0 && position.h > 0 && position.x.saturating_add(position.w) <= self.columns
    }
}

#[cfg(test)]
mod test {
    use crate::Position;

    use super::GridConfig;

    #[test]
    fn placements_must_fit_the_columns() {
        let grid = GridConfig::default();

        assert!(grid.fits(&Position { x: 0, y: 10, w: 6, h: 1 }));
        assert!(!grid.fits(&Position { x: 4, y: 0, w: 3, h: 1 }));
        assert!(!grid.fits(&Position { x: 0, y: 0, w: 0, h: 1 }));
    }
}
