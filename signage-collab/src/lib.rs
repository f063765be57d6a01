mod db;
mod displays;
mod fanout;
mod layouts;
mod slideshows;
mod widgets;

use std::sync::Arc;

pub use db::*;
pub use displays::*;
pub use fanout::*;
pub use layouts::*;
pub use slideshows::*;
pub use widgets::*;

use signage_core::{Config, DocumentId, SlideshowError, StatusBarError, WidgetDataError};
use thiserror::Error;

/// The signage system, managing displays, their widgets, slideshows and layouts,
/// and notifying subscribers when something they show changes.
pub struct Signage {
    pub events: Arc<EventRegistry>,
    pub config: Arc<Config>,

    pub displays: DisplayManager,
    pub widgets: WidgetManager,
    pub slideshows: SlideshowManager,
    pub slides: SlideManager,
    pub layouts: LayoutManager,
}

/// A type passed to the managers, to access the store and emit events.
#[derive(Clone)]
pub struct SignageContext {
    pub database: Arc<dyn Database>,
    pub events: Arc<EventRegistry>,
    pub config: Arc<Config>,
}

pub type SignageResult<T> = std::result::Result<T, SignageError>;

#[derive(Debug, Error)]
pub enum SignageError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    WidgetData(#[from] WidgetDataError),
    #[error(transparent)]
    Slideshow(#[from] SlideshowError),
    #[error(transparent)]
    StatusBar(#[from] StatusBarError),
    #[error("{resource} {id} doesn't exist")]
    MissingReference {
        resource: &'static str,
        id: DocumentId,
    },
    #[error("Widget {widget_id} doesn't fit in a grid of {columns} columns")]
    InvalidPlacement { widget_id: DocumentId, columns: u32 },
}

impl Signage {
    pub fn new(database: Arc<dyn Database>, events: Arc<EventRegistry>, config: Config) -> Self {
        let context = SignageContext {
            database,
            events: events.clone(),
            config: Arc::new(config),
        };

        Self {
            events,
            config: context.config.clone(),

            displays: DisplayManager::new(&context),
            widgets: WidgetManager::new(&context),
            slideshows: SlideshowManager::new(&context),
            slides: SlideManager::new(&context),
            layouts: LayoutManager::new(&context),
        }
    }
}

impl SignageContext {
    /// Notifies subscribers of every given display, re-reading each one first
    pub(crate) async fn notify_updated(&self, display_ids: &[DocumentId]) -> SignageResult<()> {
        let mut notified: Vec<DocumentId> = Vec::new();

        for display_id in display_ids {
            if notified.contains(display_id) {
                continue;
            }

            let display = self.database.display_by_id(display_id).await?;
            self.events
                .notify_display(display_id, signage_core::DisplayAction::Update, Some(display));

            notified.push(*display_id);
        }

        Ok(())
    }
}
