use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{displays, layouts, schemas, serialized, slideshows, sse, widgets};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "signage API",
        description = "signage-server exposes endpoints to manage displays and what they show"
    ),
    paths(
        displays::list_displays,
        displays::display,
        displays::create_display,
        displays::update_display,
        displays::delete_display,
        displays::display_events,
        widgets::list_widgets,
        widgets::widget,
        widgets::create_widget,
        widgets::update_widget,
        widgets::delete_widget,
        slideshows::list_slideshows,
        slideshows::slideshow,
        slideshows::create_slideshow,
        slideshows::update_slideshow,
        slideshows::delete_slideshow,
        slideshows::append_slide,
        slideshows::remove_slide,
        slideshows::reorder_slides,
        slideshows::list_slides,
        slideshows::slide,
        slideshows::create_slide,
        slideshows::update_slide,
        slideshows::delete_slide,
        layouts::list_layouts,
        layouts::layout,
        layouts::create_layout,
        layouts::update_layout,
        layouts::delete_layout,
        layouts::create_display_from_layout,
        sse::global_events,
    ),
    components(schemas(
        serialized::Display,
        serialized::PopulatedDisplay,
        serialized::Widget,
        serialized::Slideshow,
        serialized::PopulatedSlideshow,
        serialized::Slide,
        serialized::Layout,
        schemas::WidgetSchema,
        schemas::NewDisplaySchema,
        schemas::UpdateDisplaySchema,
        schemas::NewWidgetSchema,
        schemas::UpdateWidgetSchema,
        schemas::NewSlideshowSchema,
        schemas::UpdateSlideshowSchema,
        schemas::AppendSlideSchema,
        schemas::ReorderSchema,
        schemas::NewSlideSchema,
        schemas::UpdateSlideSchema,
        schemas::NewLayoutSchema,
        schemas::UpdateLayoutSchema,
        schemas::DisplayFromLayoutSchema,
    )),
    tags(
        (name = "displays", description = "Displays and their event streams"),
        (name = "widgets"),
        (name = "slideshows"),
        (name = "slides"),
        (name = "layouts", description = "Reusable templates for new displays"),
        (name = "events", description = "Notifications for every display")
    )
)]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
