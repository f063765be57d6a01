use log::info;
use signage_core::{DocumentId, Position, Widget, WidgetData, WidgetDataError, WidgetType};

use crate::{
    Database, DatabaseError, NewWidget, SignageContext, SignageResult, UpdatedDisplay,
    UpdatedWidget,
};

pub struct WidgetManager {
    context: SignageContext,
}

/// A widget to create, optionally placed straight onto a display
#[derive(Debug, Clone)]
pub struct WidgetDraft {
    pub name: String,
    pub data: WidgetData,
    pub position: Position,
    pub display_id: Option<DocumentId>,
}

#[derive(Debug, Clone, Default)]
pub struct WidgetChanges {
    pub name: Option<String>,
    pub data: Option<WidgetData>,
    pub position: Option<Position>,
}

impl WidgetManager {
    pub fn new(context: &SignageContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn list(&self) -> SignageResult<Vec<Widget>> {
        Ok(self.context.database.list_widgets().await?)
    }

    pub async fn get(&self, widget_id: &DocumentId) -> SignageResult<Widget> {
        Ok(self.context.database.widget_by_id(widget_id).await?)
    }

    /// Creates a widget, appending it to the given display if any
    pub async fn create(&self, draft: WidgetDraft, creator_id: &str) -> SignageResult<Widget> {
        let db = self.context.database.as_ref();

        validate_widget_data(db, &draft.data).await?;

        let display = match draft.display_id {
            Some(display_id) => Some(db.display_by_id(&display_id).await?),
            None => None,
        };

        let widget = db
            .create_widget(NewWidget {
                name: draft.name,
                data: draft.data,
                position: draft.position,
                creator_id: creator_id.to_string(),
            })
            .await?;

        info!("Created {} widget {}", widget.kind(), widget.id);

        if let Some(display) = display {
            let mut widgets = display.widgets;
            widgets.push(widget.id);

            db.update_display(UpdatedDisplay {
                id: display.id,
                name: None,
                description: None,
                widgets: Some(widgets),
                layout: None,
                orientation: None,
                status_bar: None,
            })
            .await?;

            self.context.notify_updated(&[display.id]).await?;
        }

        Ok(widget)
    }

    pub async fn update(
        &self,
        widget_id: &DocumentId,
        changes: WidgetChanges,
    ) -> SignageResult<Widget> {
        let db = self.context.database.as_ref();

        if let Some(data) = &changes.data {
            validate_widget_data(db, data).await?;
        }

        let widget = db
            .update_widget(UpdatedWidget {
                id: *widget_id,
                name: changes.name,
                data: changes.data,
                position: changes.position,
            })
            .await?;

        let displays: Vec<_> = db
            .displays_with_widget(widget_id)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();

        self.context.notify_updated(&displays).await?;

        Ok(widget)
    }

    /// Detaches the widget from every display showing it, then deletes it
    pub async fn delete(&self, widget_id: &DocumentId) -> SignageResult<()> {
        let db = self.context.database.as_ref();

        // Ensure the widget exists
        db.widget_by_id(widget_id).await?;

        let displays = db.displays_with_widget(widget_id).await?;
        let mut affected = Vec::with_capacity(displays.len());

        for display in displays {
            let widgets = display
                .widgets
                .into_iter()
                .filter(|id| id != widget_id)
                .collect();

            db.update_display(UpdatedDisplay {
                id: display.id,
                name: None,
                description: None,
                widgets: Some(widgets),
                layout: None,
                orientation: None,
                status_bar: None,
            })
            .await?;

            affected.push(display.id);
        }

        db.delete_widgets(&[*widget_id]).await?;
        info!("Deleted widget {}", widget_id);

        self.context.notify_updated(&affected).await
    }
}

/// Checks a widget payload, including that any slideshow it refers to exists.
/// Nothing is written here, so callers run this before any mutation.
pub async fn validate_widget_data(db: &dyn Database, data: &WidgetData) -> SignageResult<()> {
    data.validate()?;

    if let Some(slideshow_id) = data.slideshow_id() {
        match db.slideshow_by_id(&slideshow_id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound { .. }) => {
                return Err(WidgetDataError::new(
                    WidgetType::Slideshow,
                    format!("slideshow {} doesn't exist", slideshow_id),
                )
                .into())
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use signage_core::{Config, DocumentId, Position, SlideshowData, WidgetData};

    use crate::{
        fanout::test::RecordingSink, Database, EventRegistry, MemoryDatabase, NewDisplay,
        NewSlideshow, Signage, SignageError, WidgetChanges, WidgetDraft,
    };

    fn signage() -> (Signage, Arc<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::new());
        let signage = Signage::new(db.clone(), EventRegistry::new(), Config::default());

        (signage, db)
    }

    fn draft(data: WidgetData, display_id: Option<DocumentId>) -> WidgetDraft {
        WidgetDraft {
            name: "widget".to_string(),
            data,
            position: Position::default(),
            display_id,
        }
    }

    async fn display(db: &MemoryDatabase) -> DocumentId {
        db.create_display(NewDisplay {
            name: "lobby".to_string(),
            description: String::new(),
            widgets: vec![],
            layout: Default::default(),
            orientation: Default::default(),
            status_bar: Default::default(),
            creator_id: "admin".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn missing_slideshows_are_rejected_before_writing() {
        let (signage, db) = signage();
        let data = WidgetData::Slideshow(SlideshowData {
            slideshow_id: DocumentId::generate(),
        });

        let error = signage.widgets.create(draft(data, None), "admin").await.unwrap_err();

        assert!(matches!(error, SignageError::WidgetData(_)));
        assert!(error.to_string().starts_with("Invalid data for Slideshow widget"));
        assert!(db.list_widgets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_slideshows_can_be_shown() {
        let (signage, db) = signage();
        let slideshow = db
            .create_slideshow(NewSlideshow {
                name: "menu".to_string(),
                slides: vec![],
                creator_id: "admin".to_string(),
            })
            .await
            .unwrap();

        let data = WidgetData::Slideshow(SlideshowData {
            slideshow_id: slideshow.id,
        });

        let widget = signage.widgets.create(draft(data, None), "admin").await.unwrap();
        assert_eq!(widget.data.slideshow_id(), Some(slideshow.id));
    }

    #[tokio::test]
    async fn widgets_can_be_created_onto_a_display() {
        let (signage, db) = signage();
        let display_id = display(&db).await;
        let sink = RecordingSink::new();

        signage
            .events
            .add_client(&display_id.to_string(), sink.clone());

        let widget = signage
            .widgets
            .create(draft(WidgetData::Empty, Some(display_id)), "admin")
            .await
            .unwrap();

        let display = db.display_by_id(&display_id).await.unwrap();

        assert_eq!(display.widgets, vec![widget.id]);
        assert_eq!(sink.frames().len(), 1);
        assert!(sink.frames()[0].contains("\"action\":\"update\""));
    }

    #[tokio::test]
    async fn unknown_displays_create_nothing() {
        let (signage, db) = signage();

        let error = signage
            .widgets
            .create(draft(WidgetData::Empty, Some(DocumentId::generate())), "admin")
            .await
            .unwrap_err();

        assert!(matches!(error, SignageError::Database(e) if e.is_not_found()));
        assert!(db.list_widgets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_detaches_from_displays() {
        let (signage, db) = signage();
        let display_id = display(&db).await;

        let widget = signage
            .widgets
            .create(draft(WidgetData::Empty, Some(display_id)), "admin")
            .await
            .unwrap();

        signage.widgets.delete(&widget.id).await.unwrap();

        assert!(db.display_by_id(&display_id).await.unwrap().widgets.is_empty());
        assert!(db.widget_by_id(&widget.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn updates_notify_displays_showing_the_widget() {
        let (signage, db) = signage();
        let display_id = display(&db).await;
        let sink = RecordingSink::new();

        let widget = signage
            .widgets
            .create(draft(WidgetData::Empty, Some(display_id)), "admin")
            .await
            .unwrap();

        signage
            .events
            .add_client(crate::GLOBAL_CHANNEL, sink.clone());

        signage
            .widgets
            .update(
                &widget.id,
                WidgetChanges {
                    name: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].contains(&display_id.to_string()));
        assert!(frames[0].contains("\"action\":\"update\""));
    }
}
