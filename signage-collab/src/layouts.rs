use log::info;
use signage_core::{DocumentId, GridConfig, Layout, LayoutPlacement, StatusBar};

use crate::{NewLayout, SignageContext, SignageError, SignageResult, UpdatedLayout};

pub struct LayoutManager {
    context: SignageContext,
}

#[derive(Debug, Clone)]
pub struct LayoutDraft {
    pub name: String,
    pub description: String,
    pub grid: GridConfig,
    pub status_bar: StatusBar,
    pub widgets: Vec<LayoutPlacement>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub grid: Option<GridConfig>,
    pub status_bar: Option<StatusBar>,
    pub widgets: Option<Vec<LayoutPlacement>>,
}

impl LayoutManager {
    pub fn new(context: &SignageContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn list(&self) -> SignageResult<Vec<Layout>> {
        Ok(self.context.database.list_layouts().await?)
    }

    pub async fn get(&self, layout_id: &DocumentId) -> SignageResult<Layout> {
        Ok(self.context.database.layout_by_id(layout_id).await?)
    }

    pub async fn create(&self, draft: LayoutDraft, creator_id: &str) -> SignageResult<Layout> {
        draft.status_bar.validate()?;
        check_placements(&draft.grid, &draft.widgets)?;

        let layout = self
            .context
            .database
            .create_layout(NewLayout {
                name: draft.name,
                description: draft.description,
                grid: draft.grid,
                status_bar: draft.status_bar,
                widgets: draft.widgets,
                creator_id: creator_id.to_string(),
            })
            .await?;

        info!("Created layout {} ({})", layout.name, layout.id);
        Ok(layout)
    }

    pub async fn update(
        &self,
        layout_id: &DocumentId,
        changes: LayoutChanges,
    ) -> SignageResult<Layout> {
        if let Some(status_bar) = &changes.status_bar {
            status_bar.validate()?;
        }

        // Placements are checked against the grid the layout will end up with
        if changes.grid.is_some() || changes.widgets.is_some() {
            let current = self.context.database.layout_by_id(layout_id).await?;
            let grid = changes.grid.unwrap_or(current.grid);
            let widgets = changes.widgets.as_ref().unwrap_or(&current.widgets);

            check_placements(&grid, widgets)?;
        }

        Ok(self
            .context
            .database
            .update_layout(UpdatedLayout {
                id: *layout_id,
                name: changes.name,
                description: changes.description,
                grid: changes.grid,
                status_bar: changes.status_bar,
                widgets: changes.widgets,
            })
            .await?)
    }

    /// Deletes a layout. Displays created from it are unaffected.
    pub async fn delete(&self, layout_id: &DocumentId) -> SignageResult<()> {
        self.context.database.delete_layout(layout_id).await?;
        info!("Deleted layout {}", layout_id);

        Ok(())
    }
}

fn check_placements(grid: &GridConfig, placements: &[LayoutPlacement]) -> SignageResult<()> {
    match placements.iter().find(|p| !grid.fits(&p.position)) {
        Some(placement) => Err(SignageError::InvalidPlacement {
            widget_id: placement.widget_id,
            columns: grid.columns,
        }),
        None => Ok(()),
    }
}
