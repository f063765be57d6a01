use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use signage_collab::{
    DisplayChanges, DisplayDraft, LayoutChanges, LayoutDraft, SlideChanges, SlideDraft,
    SlideshowChanges, WidgetDescriptor,
};
use signage_core::{
    DocumentId, GridConfig, LayoutPlacement, LayoutStyle, Orientation, Position, SlideKind,
    StatusBar, WidgetData, WidgetDataError, WidgetType,
};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServerError;

/// A widget as sent by clients, either on its own or as part of a display
#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct WidgetSchema {
    /// Present when the widget already exists
    #[serde(rename = "_id", alias = "id", default)]
    #[schema(value_type = Option<String>)]
    pub id: Option<DocumentId>,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "announcement")]
    pub kind: WidgetType,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "one")]
    #[validate(range(min = 1))]
    pub w: u32,
    #[serde(default = "one")]
    #[validate(range(min = 1))]
    pub h: u32,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

fn one() -> u32 {
    1
}

impl WidgetSchema {
    pub fn into_descriptor(self) -> Result<WidgetDescriptor, WidgetDataError> {
        Ok(WidgetDescriptor {
            id: self.id,
            name: self.name,
            data: WidgetData::from_parts(self.kind, self.data)?,
            position: Position {
                x: self.x,
                y: self.y,
                w: self.w,
                h: self.h,
            },
        })
    }
}

fn into_descriptors(
    widgets: Option<Vec<WidgetSchema>>,
) -> Result<Option<Vec<WidgetDescriptor>>, WidgetDataError> {
    widgets
        .map(|w| w.into_iter().map(|w| w.into_descriptor()).collect())
        .transpose()
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewDisplaySchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = String, example = "spaced")]
    pub layout: LayoutStyle,
    #[serde(default)]
    #[schema(value_type = String, example = "landscape")]
    pub orientation: Orientation,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub status_bar: StatusBar,
    #[validate(nested)]
    pub widgets: Option<Vec<WidgetSchema>>,
}

impl NewDisplaySchema {
    pub fn into_draft(self) -> Result<DisplayDraft, WidgetDataError> {
        Ok(DisplayDraft {
            widgets: into_descriptors(self.widgets)?,
            name: self.name,
            description: self.description,
            layout: self.layout,
            orientation: self.orientation,
            status_bar: self.status_bar,
        })
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct UpdateDisplaySchema {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub layout: Option<LayoutStyle>,
    #[schema(value_type = Option<String>)]
    pub orientation: Option<Orientation>,
    #[schema(value_type = Object)]
    pub status_bar: Option<StatusBar>,
    /// When present, the display's widgets are made to match this list
    #[validate(nested)]
    pub widgets: Option<Vec<WidgetSchema>>,
}

impl UpdateDisplaySchema {
    pub fn into_changes(self) -> Result<DisplayChanges, WidgetDataError> {
        Ok(DisplayChanges {
            widgets: into_descriptors(self.widgets)?,
            name: self.name,
            description: self.description,
            layout: self.layout,
            orientation: self.orientation,
            status_bar: self.status_bar,
        })
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewWidgetSchema {
    #[serde(flatten)]
    #[validate(nested)]
    pub widget: WidgetSchema,
    /// The display to append the new widget to
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub display_id: Option<DocumentId>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct UpdateWidgetSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<WidgetType>,
    pub x: Option<u32>,
    pub y: Option<u32>,
    #[validate(range(min = 1))]
    pub w: Option<u32>,
    #[validate(range(min = 1))]
    pub h: Option<u32>,
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

impl UpdateWidgetSchema {
    /// Applies the given coordinates over the current position
    pub fn position(&self, current: Position) -> Option<Position> {
        if self.x.is_none() && self.y.is_none() && self.w.is_none() && self.h.is_none() {
            return None;
        }

        Some(Position {
            x: self.x.unwrap_or(current.x),
            y: self.y.unwrap_or(current.y),
            w: self.w.unwrap_or(current.w),
            h: self.h.unwrap_or(current.h),
        })
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewSlideshowSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub slides: Vec<DocumentId>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct UpdateSlideshowSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub slides: Option<Vec<DocumentId>>,
}

impl From<UpdateSlideshowSchema> for SlideshowChanges {
    fn from(value: UpdateSlideshowSchema) -> Self {
        Self {
            name: value.name,
            slides: value.slides,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendSlideSchema {
    #[schema(value_type = String)]
    pub slide_id: DocumentId,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReorderSchema {
    pub old_index: i64,
    pub new_index: i64,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewSlideSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "photo")]
    pub kind: SlideKind,
    /// Seconds on screen, 0 or absent for the default
    pub duration: Option<u32>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

impl From<NewSlideSchema> for SlideDraft {
    fn from(value: NewSlideSchema) -> Self {
        Self {
            name: value.name,
            kind: value.kind,
            duration: value.duration,
            data: value.data,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct UpdateSlideSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<SlideKind>,
    pub duration: Option<u32>,
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

impl From<UpdateSlideSchema> for SlideChanges {
    fn from(value: UpdateSlideSchema) -> Self {
        Self {
            name: value.name,
            kind: value.kind,
            duration: value.duration,
            data: value.data,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct NewLayoutSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub grid: GridConfig,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub status_bar: StatusBar,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub widgets: Vec<LayoutPlacement>,
}

impl From<NewLayoutSchema> for LayoutDraft {
    fn from(value: NewLayoutSchema) -> Self {
        Self {
            name: value.name,
            description: value.description,
            grid: value.grid,
            status_bar: value.status_bar,
            widgets: value.widgets,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct UpdateLayoutSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub grid: Option<GridConfig>,
    #[schema(value_type = Object)]
    pub status_bar: Option<StatusBar>,
    #[schema(value_type = Object)]
    pub widgets: Option<Vec<LayoutPlacement>>,
}

impl From<UpdateLayoutSchema> for LayoutChanges {
    fn from(value: UpdateLayoutSchema) -> Self {
        Self {
            name: value.name,
            description: value.description,
            grid: value.grid,
            status_bar: value.status_bar,
            widgets: value.widgets,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
pub struct DisplayFromLayoutSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(extracted) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        extracted
            .validate()
            .map_err(|e| ServerError::BadRequest(format!("Request body is invalid: {}", e)))?;

        Ok(Self(extracted))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use signage_core::{Position, WidgetType};
    use validator::Validate;

    use super::{NewDisplaySchema, UpdateWidgetSchema, WidgetSchema};

    #[test]
    fn widgets_default_to_a_single_cell() {
        let widget: WidgetSchema = serde_json::from_value(json!({
            "name": "Clock",
            "type": "empty"
        }))
        .unwrap();

        assert_eq!(widget.kind, WidgetType::Empty);
        assert_eq!(widget.into_descriptor().unwrap().position, Position::default());
    }

    #[test]
    fn nested_widgets_are_validated() {
        let display: NewDisplaySchema = serde_json::from_value(json!({
            "name": "Lobby",
            "widgets": [{ "name": "Clock", "type": "empty", "w": 0 }]
        }))
        .unwrap();

        assert!(display.validate().is_err());
    }

    #[test]
    fn partial_positions_keep_the_rest() {
        let update: UpdateWidgetSchema = serde_json::from_value(json!({ "x": 3 })).unwrap();
        let current = Position { x: 0, y: 2, w: 2, h: 1 };

        assert_eq!(
            update.position(current),
            Some(Position { x: 3, y: 2, w: 2, h: 1 })
        );

        let untouched: UpdateWidgetSchema = serde_json::from_value(json!({})).unwrap();
        assert_eq!(untouched.position(current), None);
    }
}
