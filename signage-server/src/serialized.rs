//! All schemas that are exposed from endpoints are defined here
//! along with the ToSerialized impls

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use signage_collab::{PopulatedDisplay as CollabPopulatedDisplay, ResolvedSlideshow};
use signage_core::{
    Display as CoreDisplay, DocumentId, GridConfig, Layout as CoreLayout, LayoutPlacement,
    LayoutStyle, Orientation, Slide as CoreSlide, SlideKind, Slideshow as CoreSlideshow,
    StatusBar, Widget as CoreWidget, WidgetType,
};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Display {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    description: String,
    #[schema(value_type = Vec<String>)]
    widgets: Vec<DocumentId>,
    #[schema(value_type = String)]
    layout: LayoutStyle,
    #[schema(value_type = String)]
    orientation: Orientation,
    #[schema(value_type = Object)]
    status_bar: StatusBar,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

/// A display with its widgets in place of their ids
#[derive(Debug, Serialize, ToSchema)]
pub struct PopulatedDisplay {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    description: String,
    widgets: Vec<Widget>,
    #[schema(value_type = String)]
    layout: LayoutStyle,
    #[schema(value_type = String)]
    orientation: Orientation,
    #[schema(value_type = Object)]
    status_bar: StatusBar,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Widget {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    kind: WidgetType,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    #[schema(value_type = Object)]
    data: Value,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Slideshow {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    #[schema(value_type = Vec<String>)]
    slides: Vec<DocumentId>,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

/// A slideshow with its slides in place of their ids
#[derive(Debug, Serialize, ToSchema)]
pub struct PopulatedSlideshow {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    slides: Vec<Slide>,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Slide {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    kind: SlideKind,
    /// The stored duration, in seconds
    duration: Option<u32>,
    /// How long the slide is shown for, in seconds
    effective_duration: u64,
    #[schema(value_type = Object)]
    data: Value,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Layout {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    id: DocumentId,
    name: String,
    description: String,
    #[schema(value_type = Object)]
    grid: GridConfig,
    #[schema(value_type = Object)]
    status_bar: StatusBar,
    #[schema(value_type = Object)]
    widgets: Vec<LayoutPlacement>,
    creator_id: String,
    #[schema(value_type = String)]
    creation_date: DateTime<Utc>,
    #[schema(value_type = String)]
    last_update: DateTime<Utc>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<Display> for CoreDisplay {
    fn to_serialized(&self) -> Display {
        Display {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            widgets: self.widgets.clone(),
            layout: self.layout,
            orientation: self.orientation,
            status_bar: self.status_bar.clone(),
            creator_id: self.creator_id.clone(),
            creation_date: self.creation_date,
            last_update: self.last_update,
        }
    }
}

impl ToSerialized<PopulatedDisplay> for CollabPopulatedDisplay {
    fn to_serialized(&self) -> PopulatedDisplay {
        let display = &self.display;

        PopulatedDisplay {
            id: display.id,
            name: display.name.clone(),
            description: display.description.clone(),
            widgets: self.widgets.to_serialized(),
            layout: display.layout,
            orientation: display.orientation,
            status_bar: display.status_bar.clone(),
            creator_id: display.creator_id.clone(),
            creation_date: display.creation_date,
            last_update: display.last_update,
        }
    }
}

impl ToSerialized<Widget> for CoreWidget {
    fn to_serialized(&self) -> Widget {
        Widget {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind(),
            x: self.position.x,
            y: self.position.y,
            w: self.position.w,
            h: self.position.h,
            data: self.data.to_value(),
            creator_id: self.creator_id.clone(),
            creation_date: self.creation_date,
            last_update: self.last_update,
        }
    }
}

impl ToSerialized<Slideshow> for CoreSlideshow {
    fn to_serialized(&self) -> Slideshow {
        Slideshow {
            id: self.id,
            name: self.name.clone(),
            slides: self.slides.clone(),
            creator_id: self.creator_id.clone(),
            creation_date: self.creation_date,
            last_update: self.last_update,
        }
    }
}

impl Slide {
    /// Slides are serialized along with how long they stay on screen
    pub fn new(slide: &CoreSlide, effective_duration: Duration) -> Self {
        Self {
            id: slide.id,
            name: slide.name.clone(),
            kind: slide.kind,
            duration: slide.duration,
            effective_duration: effective_duration.as_secs(),
            data: slide.data.clone(),
            creator_id: slide.creator_id.clone(),
            creation_date: slide.creation_date,
            last_update: slide.last_update,
        }
    }
}

impl PopulatedSlideshow {
    pub fn new(resolved: &ResolvedSlideshow, duration: impl Fn(&CoreSlide) -> Duration) -> Self {
        let slideshow = &resolved.slideshow;

        Self {
            id: slideshow.id,
            name: slideshow.name.clone(),
            slides: resolved
                .slides
                .iter()
                .map(|s| Slide::new(s, duration(s)))
                .collect(),
            creator_id: slideshow.creator_id.clone(),
            creation_date: slideshow.creation_date,
            last_update: slideshow.last_update,
        }
    }
}

impl ToSerialized<Layout> for CoreLayout {
    fn to_serialized(&self) -> Layout {
        Layout {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            grid: self.grid,
            status_bar: self.status_bar.clone(),
            widgets: self.widgets.clone(),
            creator_id: self.creator_id.clone(),
            creation_date: self.creation_date,
            last_update: self.last_update,
        }
    }
}
