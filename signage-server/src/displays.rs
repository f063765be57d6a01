use axum::{
    body::Body,
    extract::Path,
    response::Response,
    routing::get,
    Json,
};
use signage_core::DocumentId;

use crate::{
    auth::Creator,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewDisplaySchema, UpdateDisplaySchema, ValidatedJson},
    serialized::{Display, PopulatedDisplay, ToSerialized},
    sse, Router,
};

#[utoipa::path(
    get,
    path = "/v1/displays",
    tag = "displays",
    responses(
        (status = 200, body = Vec<Display>)
    )
)]
async fn list_displays(context: ServerContext) -> ServerResult<Json<Vec<Display>>> {
    let displays = context.signage.displays.list().await?;

    Ok(Json(displays.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/displays/{id}",
    tag = "displays",
    params(("id" = String, Path, description = "Display id")),
    responses(
        (status = 200, body = PopulatedDisplay),
        (status = 404, description = "Display not found")
    )
)]
async fn display(
    context: ServerContext,
    Path(display_id): Path<DocumentId>,
) -> ServerResult<Json<PopulatedDisplay>> {
    let display = context.signage.displays.get(&display_id).await?;

    Ok(Json(display.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/displays",
    tag = "displays",
    request_body = NewDisplaySchema,
    responses(
        (status = 200, body = Display),
        (status = 400, description = "A widget or the status bar is invalid")
    )
)]
async fn create_display(
    context: ServerContext,
    creator: Creator,
    ValidatedJson(body): ValidatedJson<NewDisplaySchema>,
) -> ServerResult<Json<Display>> {
    let display = context
        .signage
        .displays
        .create(body.into_draft()?, creator.id())
        .await?;

    Ok(Json(display.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/displays/{id}",
    tag = "displays",
    params(("id" = String, Path, description = "Display id")),
    request_body = UpdateDisplaySchema,
    responses(
        (status = 200, body = Display),
        (status = 400, description = "A widget or the status bar is invalid"),
        (status = 404, description = "Display not found")
    )
)]
async fn update_display(
    context: ServerContext,
    creator: Creator,
    Path(display_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<UpdateDisplaySchema>,
) -> ServerResult<Json<Display>> {
    let display = context
        .signage
        .displays
        .update(&display_id, body.into_changes()?, creator.id())
        .await?;

    Ok(Json(display.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/displays/{id}",
    tag = "displays",
    params(("id" = String, Path, description = "Display id")),
    responses(
        (status = 200, description = "The display and its widgets were deleted"),
        (status = 404, description = "Display not found")
    )
)]
async fn delete_display(
    context: ServerContext,
    Path(display_id): Path<DocumentId>,
) -> ServerResult<()> {
    context.signage.displays.delete(&display_id).await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/displays/{id}/events",
    tag = "displays",
    params(("id" = String, Path, description = "Display id")),
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "Notifications about the display"
        ),
        (status = 404, description = "Display not found")
    )
)]
async fn display_events(
    context: ServerContext,
    Path(display_id): Path<DocumentId>,
) -> ServerResult<Response<Body>> {
    // Ensure the display exists
    context.signage.displays.get(&display_id).await?;

    Ok(sse::subscribe(context.events(), display_id.to_string()).into_response())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_displays).post(create_display))
        .route(
            "/:id",
            get(display).put(update_display).delete(delete_display),
        )
        .route("/:id/events", get(display_events))
}
