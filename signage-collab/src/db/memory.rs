use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use signage_core::{Display, DocumentId, Layout, Slide, Slideshow, Widget};

use super::{
    order_by_ids, Database, DatabaseError, Document, NewDisplay, NewLayout, NewSlide,
    NewSlideshow, NewWidget, Result, UpdatedDisplay, UpdatedLayout, UpdatedSlide,
    UpdatedSlideshow, UpdatedWidget,
};

/// An in-process document store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryDatabase {
    displays: Collection<Display>,
    widgets: Collection<Widget>,
    slideshows: Collection<Slideshow>,
    slides: Collection<Slide>,
    layouts: Collection<Layout>,

    #[cfg(test)]
    faults: parking_lot::Mutex<Vec<Fault>>,
}

/// A store failure that tests can provoke
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fault {
    CreateWidget { name: String },
    UpdateWidget { id: DocumentId },
    DeleteWidgets,
}

struct Collection<T> {
    /// Incremented on every insert, to list documents in creation order
    sequence: AtomicU64,
    documents: DashMap<DocumentId, (u64, T)>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            documents: Default::default(),
        }
    }
}

impl<T> Collection<T>
where
    T: Document + Clone,
{
    fn get(&self, id: &DocumentId) -> Result<T> {
        self.documents
            .get(id)
            .map(|entry| entry.1.clone())
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut matching: Vec<_> = self
            .documents
            .iter()
            .filter(|entry| predicate(&entry.1))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by_key(|(sequence, _)| *sequence);
        matching.into_iter().map(|(_, document)| document).collect()
    }

    fn all(&self) -> Vec<T> {
        self.filter(|_| true)
    }

    fn by_ids(&self, ids: &[DocumentId]) -> Vec<T> {
        let found = self.filter(|d| ids.contains(&d.id()));
        order_by_ids(ids, found)
    }

    fn insert(&self, new: T::New) -> T {
        let document = T::create(new, DocumentId::generate(), Utc::now());
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        self.documents
            .insert(document.id(), (sequence, document.clone()));

        document
    }

    fn update(&self, id: &DocumentId, updated: T::Updated) -> Result<T> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;

        entry.1.apply(updated, Utc::now());
        Ok(entry.1.clone())
    }

    fn remove(&self, id: &DocumentId) -> Result<()> {
        self.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))
    }

    fn remove_many(&self, ids: &[DocumentId]) -> u64 {
        ids.iter()
            .filter(|id| self.documents.remove(id).is_some())
            .count() as u64
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn inject_fault(&self, fault: Fault) {
        self.faults.lock().push(fault)
    }

    #[cfg(test)]
    fn check_fault(&self, fault: Fault) -> Result<()> {
        if self.faults.lock().contains(&fault) {
            return Err(DatabaseError::Internal("injected fault".into()));
        }

        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn display_by_id(&self, display_id: &DocumentId) -> Result<Display> {
        self.displays.get(display_id)
    }

    async fn list_displays(&self) -> Result<Vec<Display>> {
        Ok(self.displays.all())
    }

    async fn displays_with_widget(&self, widget_id: &DocumentId) -> Result<Vec<Display>> {
        Ok(self.displays.filter(|d| d.widgets.contains(widget_id)))
    }

    async fn create_display(&self, new_display: NewDisplay) -> Result<Display> {
        Ok(self.displays.insert(new_display))
    }

    async fn update_display(&self, updated_display: UpdatedDisplay) -> Result<Display> {
        self.displays.update(&updated_display.id.clone(), updated_display)
    }

    async fn delete_display(&self, display_id: &DocumentId) -> Result<()> {
        self.displays.remove(display_id)
    }

    async fn widget_by_id(&self, widget_id: &DocumentId) -> Result<Widget> {
        self.widgets.get(widget_id)
    }

    async fn widgets_by_ids(&self, widget_ids: &[DocumentId]) -> Result<Vec<Widget>> {
        Ok(self.widgets.by_ids(widget_ids))
    }

    async fn list_widgets(&self) -> Result<Vec<Widget>> {
        Ok(self.widgets.all())
    }

    async fn widgets_with_slideshow(&self, slideshow_id: &DocumentId) -> Result<Vec<Widget>> {
        Ok(self
            .widgets
            .filter(|w| w.data.slideshow_id().as_ref() == Some(slideshow_id)))
    }

    async fn create_widget(&self, new_widget: NewWidget) -> Result<Widget> {
        #[cfg(test)]
        self.check_fault(Fault::CreateWidget {
            name: new_widget.name.clone(),
        })?;

        Ok(self.widgets.insert(new_widget))
    }

    async fn update_widget(&self, updated_widget: UpdatedWidget) -> Result<Widget> {
        #[cfg(test)]
        self.check_fault(Fault::UpdateWidget {
            id: updated_widget.id,
        })?;

        self.widgets.update(&updated_widget.id.clone(), updated_widget)
    }

    async fn delete_widgets(&self, widget_ids: &[DocumentId]) -> Result<u64> {
        #[cfg(test)]
        self.check_fault(Fault::DeleteWidgets)?;

        Ok(self.widgets.remove_many(widget_ids))
    }

    async fn slideshow_by_id(&self, slideshow_id: &DocumentId) -> Result<Slideshow> {
        self.slideshows.get(slideshow_id)
    }

    async fn list_slideshows(&self) -> Result<Vec<Slideshow>> {
        Ok(self.slideshows.all())
    }

    async fn slideshows_with_slide(&self, slide_id: &DocumentId) -> Result<Vec<Slideshow>> {
        Ok(self.slideshows.filter(|s| s.slides.contains(slide_id)))
    }

    async fn create_slideshow(&self, new_slideshow: NewSlideshow) -> Result<Slideshow> {
        Ok(self.slideshows.insert(new_slideshow))
    }

    async fn update_slideshow(&self, updated_slideshow: UpdatedSlideshow) -> Result<Slideshow> {
        self.slideshows
            .update(&updated_slideshow.id.clone(), updated_slideshow)
    }

    async fn delete_slideshow(&self, slideshow_id: &DocumentId) -> Result<()> {
        self.slideshows.remove(slideshow_id)
    }

    async fn slide_by_id(&self, slide_id: &DocumentId) -> Result<Slide> {
        self.slides.get(slide_id)
    }

    async fn slides_by_ids(&self, slide_ids: &[DocumentId]) -> Result<Vec<Slide>> {
        Ok(self.slides.by_ids(slide_ids))
    }

    async fn list_slides(&self) -> Result<Vec<Slide>> {
        Ok(self.slides.all())
    }

    async fn create_slide(&self, new_slide: NewSlide) -> Result<Slide> {
        Ok(self.slides.insert(new_slide))
    }

    async fn update_slide(&self, updated_slide: UpdatedSlide) -> Result<Slide> {
        self.slides.update(&updated_slide.id.clone(), updated_slide)
    }

    async fn delete_slide(&self, slide_id: &DocumentId) -> Result<()> {
        self.slides.remove(slide_id)
    }

    async fn layout_by_id(&self, layout_id: &DocumentId) -> Result<Layout> {
        self.layouts.get(layout_id)
    }

    async fn list_layouts(&self) -> Result<Vec<Layout>> {
        Ok(self.layouts.all())
    }

    async fn create_layout(&self, new_layout: NewLayout) -> Result<Layout> {
        Ok(self.layouts.insert(new_layout))
    }

    async fn update_layout(&self, updated_layout: UpdatedLayout) -> Result<Layout> {
        self.layouts.update(&updated_layout.id.clone(), updated_layout)
    }

    async fn delete_layout(&self, layout_id: &DocumentId) -> Result<()> {
        self.layouts.remove(layout_id)
    }
}

#[cfg(test)]
mod test {
    use signage_core::{DocumentId, Position, WidgetData};

    use crate::{Database, NewWidget, UpdatedWidget};

    use super::MemoryDatabase;

    fn new_widget(name: &str) -> NewWidget {
        NewWidget {
            name: name.to_string(),
            data: WidgetData::Empty,
            position: Position::default(),
            creator_id: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn widgets_are_listed_in_creation_order() {
        let db = MemoryDatabase::new();

        for name in ["first", "second", "third"] {
            db.create_widget(new_widget(name)).await.unwrap();
        }

        let names: Vec<_> = db
            .list_widgets()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn updates_return_the_written_document() {
        let db = MemoryDatabase::new();
        let widget = db.create_widget(new_widget("clock")).await.unwrap();

        let updated = db
            .update_widget(UpdatedWidget {
                id: widget.id,
                name: Some("big clock".to_string()),
                data: None,
                position: Some(Position { x: 1, y: 1, w: 2, h: 2 }),
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "big clock");
        assert_eq!(updated.position.w, 2);
        assert!(updated.last_update >= widget.last_update);
        assert_eq!(db.widget_by_id(&widget.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let db = MemoryDatabase::new();
        let error = db.widget_by_id(&DocumentId::generate()).await.unwrap_err();

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn batched_deletes_count_existing_widgets() {
        let db = MemoryDatabase::new();
        let a = db.create_widget(new_widget("a")).await.unwrap();
        let b = db.create_widget(new_widget("b")).await.unwrap();

        let deleted = db
            .delete_widgets(&[a.id, b.id, DocumentId::generate()])
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert!(db.list_widgets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn widgets_by_ids_follow_the_requested_order() {
        let db = MemoryDatabase::new();
        let a = db.create_widget(new_widget("a")).await.unwrap();
        let b = db.create_widget(new_widget("b")).await.unwrap();

        let widgets = db
            .widgets_by_ids(&[b.id, DocumentId::generate(), a.id])
            .await
            .unwrap();

        assert_eq!(widgets, vec![b, a]);
    }
}
