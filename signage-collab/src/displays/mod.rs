mod reconcile;

pub use reconcile::*;

use log::{info, warn};
use signage_core::{
    Display, DisplayAction, DocumentId, LayoutStyle, Orientation, StatusBar, Widget,
};

use crate::{
    validate_widget_data, NewDisplay, SignageContext, SignageResult, UpdatedDisplay,
};

pub struct DisplayManager {
    context: SignageContext,
}

/// A display along with the widgets it shows, in display order
#[derive(Debug, Clone)]
pub struct PopulatedDisplay {
    pub display: Display,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone)]
pub struct DisplayDraft {
    pub name: String,
    pub description: String,
    pub layout: LayoutStyle,
    pub orientation: Orientation,
    pub status_bar: StatusBar,
    pub widgets: Option<Vec<WidgetDescriptor>>,
}

/// Changes to a display. When `widgets` is present, the display's widgets
/// are reconciled against it.
#[derive(Debug, Clone, Default)]
pub struct DisplayChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub layout: Option<LayoutStyle>,
    pub orientation: Option<Orientation>,
    pub status_bar: Option<StatusBar>,
    pub widgets: Option<Vec<WidgetDescriptor>>,
}

impl DisplayManager {
    pub fn new(context: &SignageContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn list(&self) -> SignageResult<Vec<Display>> {
        Ok(self.context.database.list_displays().await?)
    }

    /// Returns a display with its widgets. Widgets that no longer exist are left out.
    pub async fn get(&self, display_id: &DocumentId) -> SignageResult<PopulatedDisplay> {
        let db = self.context.database.as_ref();

        let display = db.display_by_id(display_id).await?;
        let widgets = db.widgets_by_ids(&display.widgets).await?;

        Ok(PopulatedDisplay { display, widgets })
    }

    pub async fn create(&self, draft: DisplayDraft, creator_id: &str) -> SignageResult<Display> {
        let db = self.context.database.as_ref();

        draft.status_bar.validate()?;
        self.validate_descriptors(draft.widgets.as_deref()).await?;

        let widgets = create_widgets_for_display(db, draft.widgets, creator_id).await?;

        let display = db
            .create_display(NewDisplay {
                name: draft.name,
                description: draft.description,
                widgets,
                layout: draft.layout,
                orientation: draft.orientation,
                status_bar: draft.status_bar,
                creator_id: creator_id.to_string(),
            })
            .await?;

        info!("Created display {} ({})", display.name, display.id);

        self.context
            .events
            .notify_display(&display.id, DisplayAction::Create, Some(display.clone()));

        Ok(display)
    }

    /// Creates a display from a layout, copying its status bar and cloning each placed widget.
    /// The display is not bound to the layout afterwards.
    pub async fn create_from_layout(
        &self,
        layout_id: &DocumentId,
        name: String,
        creator_id: &str,
    ) -> SignageResult<Display> {
        let db = self.context.database.as_ref();

        let layout = db.layout_by_id(layout_id).await?;
        let ids: Vec<_> = layout.widgets.iter().map(|p| p.widget_id).collect();
        let sources = db.widgets_by_ids(&ids).await?;

        let mut descriptors = Vec::with_capacity(layout.widgets.len());

        for placement in &layout.widgets {
            let Some(source) = sources.iter().find(|w| w.id == placement.widget_id) else {
                warn!(
                    "Layout {} places widget {} which doesn't exist, skipping",
                    layout.id, placement.widget_id
                );
                continue;
            };

            descriptors.push(WidgetDescriptor {
                id: None,
                name: source.name.clone(),
                data: source.data.clone(),
                position: placement.position,
            });
        }

        self.create(
            DisplayDraft {
                name,
                description: layout.description,
                layout: LayoutStyle::default(),
                orientation: Orientation::default(),
                status_bar: layout.status_bar,
                widgets: Some(descriptors),
            },
            creator_id,
        )
        .await
    }

    pub async fn update(
        &self,
        display_id: &DocumentId,
        changes: DisplayChanges,
        creator_id: &str,
    ) -> SignageResult<Display> {
        let db = self.context.database.as_ref();

        if let Some(status_bar) = &changes.status_bar {
            status_bar.validate()?;
        }

        self.validate_descriptors(changes.widgets.as_deref()).await?;

        let current = db.display_by_id(display_id).await?;

        let widgets = match changes.widgets {
            Some(desired) => {
                let reconciliation =
                    reconcile_widgets(db, &current.widgets, desired, creator_id).await?;

                Some(reconciliation.widgets)
            }
            None => None,
        };

        let display = db
            .update_display(UpdatedDisplay {
                id: *display_id,
                name: changes.name,
                description: changes.description,
                widgets,
                layout: changes.layout,
                orientation: changes.orientation,
                status_bar: changes.status_bar,
            })
            .await?;

        self.context
            .events
            .notify_display(display_id, DisplayAction::Update, Some(display.clone()));

        Ok(display)
    }

    /// Deletes a display along with all of its widgets
    pub async fn delete(&self, display_id: &DocumentId) -> SignageResult<()> {
        let db = self.context.database.as_ref();
        let display = db.display_by_id(display_id).await?;

        if !display.widgets.is_empty() {
            let deleted = db.delete_widgets(&display.widgets).await?;
            info!("Deleted {} widgets of display {}", deleted, display_id);
        }

        db.delete_display(display_id).await?;
        info!("Deleted display {}", display_id);

        self.context
            .events
            .notify_display(display_id, DisplayAction::Delete, None);

        Ok(())
    }

    async fn validate_descriptors(
        &self,
        descriptors: Option<&[WidgetDescriptor]>,
    ) -> SignageResult<()> {
        let db = self.context.database.as_ref();

        for descriptor in descriptors.unwrap_or_default() {
            validate_widget_data(db, &descriptor.data).await?;
        }

        Ok(())
    }
}
