use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use signage_core::{
    Display, DocumentId, GridConfig, Layout, LayoutPlacement, LayoutStyle, Orientation, Position,
    Slide, SlideKind, Slideshow, StatusBar, Widget, WidgetData,
};
use thiserror::Error;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource} {id} doesn't exist")]
    NotFound { resource: &'static str, id: String },
}

impl DatabaseError {
    pub fn not_found(resource: &'static str, id: &DocumentId) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn any(self) -> DatabaseError;
}

impl IntoDatabaseError for serde_json::Error {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }
}

/// Represents a document store holding all signage data.
///
/// Every update re-reads the stored document, applies the change and writes
/// the whole document back, returning what was written.
#[async_trait]
pub trait Database: Send + Sync {
    async fn display_by_id(&self, display_id: &DocumentId) -> Result<Display>;
    async fn list_displays(&self) -> Result<Vec<Display>>;
    /// Every display whose widget list references the widget
    async fn displays_with_widget(&self, widget_id: &DocumentId) -> Result<Vec<Display>>;
    async fn create_display(&self, new_display: NewDisplay) -> Result<Display>;
    async fn update_display(&self, updated_display: UpdatedDisplay) -> Result<Display>;
    async fn delete_display(&self, display_id: &DocumentId) -> Result<()>;

    async fn widget_by_id(&self, widget_id: &DocumentId) -> Result<Widget>;
    /// Returns the widgets that exist, in the order of `widget_ids`
    async fn widgets_by_ids(&self, widget_ids: &[DocumentId]) -> Result<Vec<Widget>>;
    async fn list_widgets(&self) -> Result<Vec<Widget>>;
    /// Every slideshow widget showing the slideshow
    async fn widgets_with_slideshow(&self, slideshow_id: &DocumentId) -> Result<Vec<Widget>>;
    async fn create_widget(&self, new_widget: NewWidget) -> Result<Widget>;
    async fn update_widget(&self, updated_widget: UpdatedWidget) -> Result<Widget>;
    /// Deletes all given widgets in one operation, returning how many existed
    async fn delete_widgets(&self, widget_ids: &[DocumentId]) -> Result<u64>;

    async fn slideshow_by_id(&self, slideshow_id: &DocumentId) -> Result<Slideshow>;
    async fn list_slideshows(&self) -> Result<Vec<Slideshow>>;
    async fn slideshows_with_slide(&self, slide_id: &DocumentId) -> Result<Vec<Slideshow>>;
    async fn create_slideshow(&self, new_slideshow: NewSlideshow) -> Result<Slideshow>;
    async fn update_slideshow(&self, updated_slideshow: UpdatedSlideshow) -> Result<Slideshow>;
    async fn delete_slideshow(&self, slideshow_id: &DocumentId) -> Result<()>;

    async fn slide_by_id(&self, slide_id: &DocumentId) -> Result<Slide>;
    /// Returns the slides that exist, in the order of `slide_ids`
    async fn slides_by_ids(&self, slide_ids: &[DocumentId]) -> Result<Vec<Slide>>;
    async fn list_slides(&self) -> Result<Vec<Slide>>;
    async fn create_slide(&self, new_slide: NewSlide) -> Result<Slide>;
    async fn update_slide(&self, updated_slide: UpdatedSlide) -> Result<Slide>;
    async fn delete_slide(&self, slide_id: &DocumentId) -> Result<()>;

    async fn layout_by_id(&self, layout_id: &DocumentId) -> Result<Layout>;
    async fn list_layouts(&self) -> Result<Vec<Layout>>;
    async fn create_layout(&self, new_layout: NewLayout) -> Result<Layout>;
    async fn update_layout(&self, updated_layout: UpdatedLayout) -> Result<Layout>;
    async fn delete_layout(&self, layout_id: &DocumentId) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct NewDisplay {
    pub name: String,
    pub description: String,
    pub widgets: Vec<DocumentId>,
    pub layout: LayoutStyle,
    pub orientation: Orientation,
    pub status_bar: StatusBar,
    pub creator_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdatedDisplay {
    pub id: DocumentId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub widgets: Option<Vec<DocumentId>>,
    pub layout: Option<LayoutStyle>,
    pub orientation: Option<Orientation>,
    pub status_bar: Option<StatusBar>,
}

#[derive(Debug, Clone)]
pub struct NewWidget {
    pub name: String,
    pub data: WidgetData,
    pub position: Position,
    pub creator_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdatedWidget {
    pub id: DocumentId,
    pub name: Option<String>,
    pub data: Option<WidgetData>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct NewSlideshow {
    pub name: String,
    pub slides: Vec<DocumentId>,
    pub creator_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdatedSlideshow {
    pub id: DocumentId,
    pub name: Option<String>,
    pub slides: Option<Vec<DocumentId>>,
}

#[derive(Debug, Clone)]
pub struct NewSlide {
    pub name: String,
    pub kind: SlideKind,
    pub duration: Option<u32>,
    pub data: Value,
    pub creator_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdatedSlide {
    pub id: DocumentId,
    pub name: Option<String>,
    pub kind: Option<SlideKind>,
    pub duration: Option<u32>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct NewLayout {
    pub name: String,
    pub description: String,
    pub grid: GridConfig,
    pub status_bar: StatusBar,
    pub widgets: Vec<LayoutPlacement>,
    pub creator_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdatedLayout {
    pub id: DocumentId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub grid: Option<GridConfig>,
    pub status_bar: Option<StatusBar>,
    pub widgets: Option<Vec<LayoutPlacement>>,
}

/// Turns new records into stored documents, and applies updates to them.
/// Shared by every [Database] implementation.
pub trait Document: Sized {
    type New;
    type Updated;

    /// Name used in errors and logs
    const RESOURCE: &'static str;
    /// Name of the collection the documents are stored in
    const COLLECTION: &'static str;

    fn id(&self) -> DocumentId;

    fn create(new: Self::New, id: DocumentId, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, updated: Self::Updated, now: DateTime<Utc>);
}

impl Document for Display {
    type New = NewDisplay;
    type Updated = UpdatedDisplay;

    const RESOURCE: &'static str = "display";
    const COLLECTION: &'static str = "displays";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn create(new: NewDisplay, id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            widgets: new.widgets,
            layout: new.layout,
            orientation: new.orientation,
            status_bar: new.status_bar,
            creator_id: new.creator_id,
            creation_date: now,
            last_update: now,
        }
    }

    fn apply(&mut self, updated: UpdatedDisplay, now: DateTime<Utc>) {
        if let Some(name) = updated.name {
            self.name = name;
        }
        if let Some(description) = updated.description {
            self.description = description;
        }
        if let Some(widgets) = updated.widgets {
            self.widgets = widgets;
        }
        if let Some(layout) = updated.layout {
            self.layout = layout;
        }
        if let Some(orientation) = updated.orientation {
            self.orientation = orientation;
        }
        if let Some(status_bar) = updated.status_bar {
            self.status_bar = status_bar;
        }

        self.last_update = now;
    }
}

impl Document for Widget {
    type New = NewWidget;
    type Updated = UpdatedWidget;

    const RESOURCE: &'static str = "widget";
    const COLLECTION: &'static str = "widgets";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn create(new: NewWidget, id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            data: new.data,
            position: new.position,
            creator_id: new.creator_id,
            creation_date: now,
            last_update: now,
        }
    }

    fn apply(&mut self, updated: UpdatedWidget, now: DateTime<Utc>) {
        if let Some(name) = updated.name {
            self.name = name;
        }
        if let Some(data) = updated.data {
            self.data = data;
        }
        if let Some(position) = updated.position {
            self.position = position;
        }

        self.last_update = now;
    }
}

impl Document for Slideshow {
    type New = NewSlideshow;
    type Updated = UpdatedSlideshow;

    const RESOURCE: &'static str = "slideshow";
    const COLLECTION: &'static str = "slideshows";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn create(new: NewSlideshow, id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            slides: new.slides,
            creator_id: new.creator_id,
            creation_date: now,
            last_update: now,
        }
    }

    fn apply(&mut self, updated: UpdatedSlideshow, now: DateTime<Utc>) {
        if let Some(name) = updated.name {
            self.name = name;
        }
        if let Some(slides) = updated.slides {
            self.slides = slides;
        }

        self.last_update = now;
    }
}

impl Document for Slide {
    type New = NewSlide;
    type Updated = UpdatedSlide;

    const RESOURCE: &'static str = "slide";
    const COLLECTION: &'static str = "slides";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn create(new: NewSlide, id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            kind: new.kind,
            duration: new.duration,
            data: new.data,
            creator_id: new.creator_id,
            creation_date: now,
            last_update: now,
        }
    }

    fn apply(&mut self, updated: UpdatedSlide, now: DateTime<Utc>) {
        if let Some(name) = updated.name {
            self.name = name;
        }
        if let Some(kind) = updated.kind {
            self.kind = kind;
        }
        if let Some(duration) = updated.duration {
            self.duration = Some(duration);
        }
        if let Some(data) = updated.data {
            self.data = data;
        }

        self.last_update = now;
    }
}

impl Document for Layout {
    type New = NewLayout;
    type Updated = UpdatedLayout;

    const RESOURCE: &'static str = "layout";
    const COLLECTION: &'static str = "layouts";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn create(new: NewLayout, id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            grid: new.grid,
            status_bar: new.status_bar,
            widgets: new.widgets,
            creator_id: new.creator_id,
            creation_date: now,
            last_update: now,
        }
    }

    fn apply(&mut self, updated: UpdatedLayout, now: DateTime<Utc>) {
        if let Some(name) = updated.name {
            self.name = name;
        }
        if let Some(description) = updated.description {
            self.description = description;
        }
        if let Some(grid) = updated.grid {
            self.grid = grid;
        }
        if let Some(status_bar) = updated.status_bar {
            self.status_bar = status_bar;
        }
        if let Some(widgets) = updated.widgets {
            self.widgets = widgets;
        }

        self.last_update = now;
    }
}

/// Orders fetched documents by a list of ids, dropping the ones that weren't found
pub(crate) fn order_by_ids<T>(ids: &[DocumentId], documents: Vec<T>) -> Vec<T>
where
    T: Document + Clone,
{
    ids.iter()
        .filter_map(|id| documents.iter().find(|d| d.id() == *id).cloned())
        .collect()
}
