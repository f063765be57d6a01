use std::time::Duration;

use log::info;
use serde_json::Value;
use signage_core::{DocumentId, Slide, SlideKind, Slideshow, WidgetData};

use crate::{
    DatabaseError, NewSlide, NewSlideshow, SignageContext, SignageError, SignageResult,
    UpdatedSlide, UpdatedSlideshow, UpdatedWidget,
};

pub struct SlideshowManager {
    context: SignageContext,
}

pub struct SlideManager {
    context: SignageContext,
}

/// A slideshow with its slides resolved, in show order
#[derive(Debug, Clone)]
pub struct ResolvedSlideshow {
    pub slideshow: Slideshow,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default)]
pub struct SlideshowChanges {
    pub name: Option<String>,
    pub slides: Option<Vec<DocumentId>>,
}

#[derive(Debug, Clone)]
pub struct SlideDraft {
    pub name: String,
    pub kind: SlideKind,
    pub duration: Option<u32>,
    pub data: Value,
}

#[derive(Debug, Clone, Default)]
pub struct SlideChanges {
    pub name: Option<String>,
    pub kind: Option<SlideKind>,
    pub duration: Option<u32>,
    pub data: Option<Value>,
}

impl SlideshowManager {
    pub fn new(context: &SignageContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn list(&self) -> SignageResult<Vec<Slideshow>> {
        Ok(self.context.database.list_slideshows().await?)
    }

    /// Returns a slideshow with its slides. Slides that no longer exist are left out.
    pub async fn get(&self, slideshow_id: &DocumentId) -> SignageResult<ResolvedSlideshow> {
        let db = self.context.database.as_ref();

        let slideshow = db.slideshow_by_id(slideshow_id).await?;
        let slides = db.slides_by_ids(&slideshow.slides).await?;

        Ok(ResolvedSlideshow { slideshow, slides })
    }

    pub async fn create(
        &self,
        name: String,
        slides: Vec<DocumentId>,
        creator_id: &str,
    ) -> SignageResult<Slideshow> {
        self.ensure_slides_exist(&slides).await?;

        let slideshow = self
            .context
            .database
            .create_slideshow(NewSlideshow {
                name,
                slides,
                creator_id: creator_id.to_string(),
            })
            .await?;

        info!("Created slideshow {} ({})", slideshow.name, slideshow.id);
        Ok(slideshow)
    }

    pub async fn update(
        &self,
        slideshow_id: &DocumentId,
        changes: SlideshowChanges,
    ) -> SignageResult<Slideshow> {
        if let Some(slides) = &changes.slides {
            self.ensure_slides_exist(slides).await?;
        }

        self.write(UpdatedSlideshow {
            id: *slideshow_id,
            name: changes.name,
            slides: changes.slides,
        })
        .await
    }

    /// Deletes a slideshow. Its slides are kept, and widgets showing it become empty widgets
    /// so no widget is left referencing a missing slideshow.
    pub async fn delete(&self, slideshow_id: &DocumentId) -> SignageResult<()> {
        let db = self.context.database.as_ref();

        db.slideshow_by_id(slideshow_id).await?;
        let displays = displays_showing(&self.context, slideshow_id).await?;

        for widget in db.widgets_with_slideshow(slideshow_id).await? {
            db.update_widget(UpdatedWidget {
                id: widget.id,
                name: None,
                data: Some(WidgetData::Empty),
                position: None,
            })
            .await?;
        }

        db.delete_slideshow(slideshow_id).await?;
        info!("Deleted slideshow {}", slideshow_id);

        self.context.notify_updated(&displays).await
    }

    /// Adds a slide to the end of the show
    pub async fn append_slide(
        &self,
        slideshow_id: &DocumentId,
        slide_id: &DocumentId,
    ) -> SignageResult<Slideshow> {
        let db = self.context.database.as_ref();

        let mut slideshow = db.slideshow_by_id(slideshow_id).await?;
        db.slide_by_id(slide_id).await?;

        slideshow.slides.push(*slide_id);

        self.write(UpdatedSlideshow {
            id: *slideshow_id,
            name: None,
            slides: Some(slideshow.slides),
        })
        .await
    }

    /// Removes every occurrence of a slide from the show. The slide itself is kept.
    pub async fn remove_slide(
        &self,
        slideshow_id: &DocumentId,
        slide_id: &DocumentId,
    ) -> SignageResult<Slideshow> {
        let mut slideshow = self.context.database.slideshow_by_id(slideshow_id).await?;

        if !slideshow.detach_slide(slide_id) {
            return Err(DatabaseError::not_found("slide", slide_id).into());
        }

        self.write(UpdatedSlideshow {
            id: *slideshow_id,
            name: None,
            slides: Some(slideshow.slides),
        })
        .await
    }

    /// Moves the slide at `old_index` to `new_index`. Out of range indices are rejected.
    pub async fn reorder(
        &self,
        slideshow_id: &DocumentId,
        old_index: i64,
        new_index: i64,
    ) -> SignageResult<Slideshow> {
        let mut slideshow = self.context.database.slideshow_by_id(slideshow_id).await?;

        slideshow.reorder(old_index, new_index)?;

        self.write(UpdatedSlideshow {
            id: *slideshow_id,
            name: None,
            slides: Some(slideshow.slides),
        })
        .await
    }

    async fn write(&self, updated: UpdatedSlideshow) -> SignageResult<Slideshow> {
        let slideshow = self.context.database.update_slideshow(updated).await?;

        let displays = displays_showing(&self.context, &slideshow.id).await?;
        self.context.notify_updated(&displays).await?;

        Ok(slideshow)
    }

    async fn ensure_slides_exist(&self, slide_ids: &[DocumentId]) -> SignageResult<()> {
        let found = self.context.database.slides_by_ids(slide_ids).await?;

        match slide_ids.iter().find(|id| !found.iter().any(|s| s.id == **id)) {
            Some(missing) => Err(SignageError::MissingReference {
                resource: "slide",
                id: *missing,
            }),
            None => Ok(()),
        }
    }
}

/// The displays with a slideshow widget showing the slideshow
async fn displays_showing(
    context: &SignageContext,
    slideshow_id: &DocumentId,
) -> SignageResult<Vec<DocumentId>> {
    let db = context.database.as_ref();
    let mut display_ids = Vec::new();

    for widget in db.widgets_with_slideshow(slideshow_id).await? {
        for display in db.displays_with_widget(&widget.id).await? {
            if !display_ids.contains(&display.id) {
                display_ids.push(display.id);
            }
        }
    }

    Ok(display_ids)
}

impl SlideManager {
    pub fn new(context: &SignageContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn list(&self) -> SignageResult<Vec<Slide>> {
        Ok(self.context.database.list_slides().await?)
    }

    pub async fn get(&self, slide_id: &DocumentId) -> SignageResult<Slide> {
        Ok(self.context.database.slide_by_id(slide_id).await?)
    }

    /// How long the slide stays on screen
    pub fn duration(&self, slide: &Slide) -> Duration {
        self.context.config.slide_duration(slide.duration)
    }

    pub async fn create(&self, draft: SlideDraft, creator_id: &str) -> SignageResult<Slide> {
        let slide = self
            .context
            .database
            .create_slide(NewSlide {
                name: draft.name,
                kind: draft.kind,
                duration: draft.duration,
                data: draft.data,
                creator_id: creator_id.to_string(),
            })
            .await?;

        info!("Created slide {} ({})", slide.name, slide.id);
        Ok(slide)
    }

    pub async fn update(&self, slide_id: &DocumentId, changes: SlideChanges) -> SignageResult<Slide> {
        let slide = self
            .context
            .database
            .update_slide(UpdatedSlide {
                id: *slide_id,
                name: changes.name,
                kind: changes.kind,
                duration: changes.duration,
                data: changes.data,
            })
            .await?;

        let mut displays = Vec::new();

        for slideshow in self.context.database.slideshows_with_slide(slide_id).await? {
            displays.extend(displays_showing(&self.context, &slideshow.id).await?);
        }

        self.context.notify_updated(&displays).await?;
        Ok(slide)
    }

    /// Removes the slide from every slideshow showing it, then deletes it
    pub async fn delete(&self, slide_id: &DocumentId) -> SignageResult<()> {
        let db = self.context.database.as_ref();

        db.slide_by_id(slide_id).await?;

        let mut displays = Vec::new();

        for mut slideshow in db.slideshows_with_slide(slide_id).await? {
            slideshow.detach_slide(slide_id);

            db.update_slideshow(UpdatedSlideshow {
                id: slideshow.id,
                name: None,
                slides: Some(slideshow.slides),
            })
            .await?;

            displays.extend(displays_showing(&self.context, &slideshow.id).await?);
        }

        db.delete_slide(slide_id).await?;
        info!("Deleted slide {}", slide_id);

        self.context.notify_updated(&displays).await
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use serde_json::json;
    use signage_core::{
        Config, DocumentId, Position, SlideKind, SlideshowData, SlideshowError, WidgetData,
    };

    use crate::{
        fanout::test::RecordingSink, Database, DisplayChanges, EventRegistry, MemoryDatabase,
        NewDisplay, NewWidget, Signage, SignageError, SlideDraft, WidgetDescriptor,
    };

    fn signage() -> (Signage, Arc<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::new());
        let signage = Signage::new(db.clone(), EventRegistry::new(), Config::default());

        (signage, db)
    }

    async fn slides(signage: &Signage, count: usize) -> Vec<DocumentId> {
        let mut ids = Vec::new();

        for i in 0..count {
            let slide = signage
                .slides
                .create(
                    SlideDraft {
                        name: format!("slide {}", i),
                        kind: SlideKind::Photo,
                        duration: None,
                        data: json!({ "url": "https://example.com/a.png" }),
                    },
                    "admin",
                )
                .await
                .unwrap();

            ids.push(slide.id);
        }

        ids
    }

    #[tokio::test]
    async fn reordering_moves_a_slide() {
        let (signage, _db) = signage();
        let ids = slides(&signage, 4).await;

        let slideshow = signage
            .slideshows
            .create("menu".to_string(), ids.clone(), "admin")
            .await
            .unwrap();

        let reordered = signage.slideshows.reorder(&slideshow.id, 0, 2).await.unwrap();

        assert_eq!(reordered.slides, vec![ids[1], ids[2], ids[0], ids[3]]);
    }

    #[tokio::test]
    async fn invalid_reorders_change_nothing() {
        let (signage, db) = signage();
        let ids = slides(&signage, 2).await;

        let slideshow = signage
            .slideshows
            .create("menu".to_string(), ids.clone(), "admin")
            .await
            .unwrap();

        let error = signage
            .slideshows
            .reorder(&slideshow.id, 0, 2)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            SignageError::Slideshow(SlideshowError::IndexOutOfBounds { index: 2, len: 2 })
        ));

        let error = signage
            .slideshows
            .reorder(&slideshow.id, -1, 0)
            .await
            .unwrap_err();

        assert!(matches!(error, SignageError::Slideshow(_)));
        assert_eq!(db.slideshow_by_id(&slideshow.id).await.unwrap().slides, ids);
    }

    #[tokio::test]
    async fn missing_slides_are_rejected() {
        let (signage, db) = signage();

        let error = signage
            .slideshows
            .create("menu".to_string(), vec![DocumentId::generate()], "admin")
            .await
            .unwrap_err();

        assert!(matches!(error, SignageError::MissingReference { .. }));
        assert!(db.list_slideshows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn slides_can_be_appended_and_removed() {
        let (signage, _db) = signage();
        let ids = slides(&signage, 2).await;

        let slideshow = signage
            .slideshows
            .create("menu".to_string(), vec![ids[0]], "admin")
            .await
            .unwrap();

        let appended = signage
            .slideshows
            .append_slide(&slideshow.id, &ids[1])
            .await
            .unwrap();

        assert_eq!(appended.slides, ids);

        let removed = signage
            .slideshows
            .remove_slide(&slideshow.id, &ids[0])
            .await
            .unwrap();

        assert_eq!(removed.slides, vec![ids[1]]);

        // The slide itself survives
        signage.slides.get(&ids[0]).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_slide_detaches_it_everywhere() {
        let (signage, db) = signage();
        let ids = slides(&signage, 2).await;

        let first = signage
            .slideshows
            .create("a".to_string(), ids.clone(), "admin")
            .await
            .unwrap();
        let second = signage
            .slideshows
            .create("b".to_string(), vec![ids[0]], "admin")
            .await
            .unwrap();

        signage.slides.delete(&ids[0]).await.unwrap();

        assert_eq!(db.slideshow_by_id(&first.id).await.unwrap().slides, vec![ids[1]]);
        assert!(db.slideshow_by_id(&second.id).await.unwrap().slides.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_slideshow_keeps_its_slides() {
        let (signage, db) = signage();
        let ids = slides(&signage, 2).await;

        let slideshow = signage
            .slideshows
            .create("a".to_string(), ids.clone(), "admin")
            .await
            .unwrap();

        signage.slideshows.delete(&slideshow.id).await.unwrap();

        assert_eq!(db.list_slides().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_slideshow_empties_the_widgets_showing_it() {
        let (signage, db) = signage();
        let ids = slides(&signage, 1).await;

        let slideshow = signage
            .slideshows
            .create("a".to_string(), ids, "admin")
            .await
            .unwrap();

        let widget = db
            .create_widget(NewWidget {
                name: "show".to_string(),
                data: WidgetData::Slideshow(SlideshowData {
                    slideshow_id: slideshow.id,
                }),
                position: Position { x: 1, y: 0, w: 2, h: 1 },
                creator_id: "admin".to_string(),
            })
            .await
            .unwrap();

        let display = db
            .create_display(NewDisplay {
                name: "lobby".to_string(),
                description: String::new(),
                widgets: vec![widget.id],
                layout: Default::default(),
                orientation: Default::default(),
                status_bar: Default::default(),
                creator_id: "admin".to_string(),
            })
            .await
            .unwrap();

        signage.slideshows.delete(&slideshow.id).await.unwrap();

        let emptied = db.widget_by_id(&widget.id).await.unwrap();
        assert_eq!(emptied.data, WidgetData::Empty);
        assert_eq!(emptied.position, widget.position);
        assert_eq!(db.display_by_id(&display.id).await.unwrap().widgets, vec![widget.id]);

        // The display still goes through the reconcile path with its stored widgets
        let updated = signage
            .displays
            .update(
                &display.id,
                DisplayChanges {
                    name: Some("hall".to_string()),
                    widgets: Some(vec![WidgetDescriptor {
                        id: Some(emptied.id),
                        name: emptied.name,
                        data: emptied.data,
                        position: emptied.position,
                    }]),
                    ..Default::default()
                },
                "admin",
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "hall");
        assert_eq!(updated.widgets, vec![widget.id]);
    }

    #[tokio::test]
    async fn deleting_a_missing_slideshow_touches_nothing() {
        let (signage, _db) = signage();

        let error = signage
            .slideshows
            .delete(&DocumentId::generate())
            .await
            .unwrap_err();

        assert!(matches!(error, SignageError::Database(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn displays_showing_a_slideshow_are_notified() {
        let (signage, db) = signage();
        let ids = slides(&signage, 2).await;

        let slideshow = signage
            .slideshows
            .create("a".to_string(), ids, "admin")
            .await
            .unwrap();

        let widget = db
            .create_widget(NewWidget {
                name: "show".to_string(),
                data: WidgetData::Slideshow(SlideshowData {
                    slideshow_id: slideshow.id,
                }),
                position: Position::default(),
                creator_id: "admin".to_string(),
            })
            .await
            .unwrap();

        let display = db
            .create_display(NewDisplay {
                name: "lobby".to_string(),
                description: String::new(),
                widgets: vec![widget.id],
                layout: Default::default(),
                orientation: Default::default(),
                status_bar: Default::default(),
                creator_id: "admin".to_string(),
            })
            .await
            .unwrap();

        let sink = RecordingSink::new();
        signage
            .events
            .add_client(&display.id.to_string(), sink.clone());

        signage.slideshows.reorder(&slideshow.id, 1, 0).await.unwrap();

        assert_eq!(sink.frames().len(), 1);
    }

    #[tokio::test]
    async fn zero_durations_use_the_default() {
        let (signage, _db) = signage();

        let slide = signage
            .slides
            .create(
                SlideDraft {
                    name: "quick".to_string(),
                    kind: SlideKind::Web,
                    duration: Some(0),
                    data: json!({}),
                },
                "admin",
            )
            .await
            .unwrap();

        assert_eq!(signage.slides.duration(&slide), Duration::from_secs(10));
    }
}
