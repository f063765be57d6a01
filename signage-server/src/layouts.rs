use axum::{
    extract::Path,
    routing::{get, post},
    Json,
};
use signage_core::DocumentId;

use crate::{
    auth::Creator,
    context::ServerContext,
    errors::ServerResult,
    schemas::{DisplayFromLayoutSchema, NewLayoutSchema, UpdateLayoutSchema, ValidatedJson},
    serialized::{Display, Layout, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/layouts",
    tag = "layouts",
    responses(
        (status = 200, body = Vec<Layout>)
    )
)]
async fn list_layouts(context: ServerContext) -> ServerResult<Json<Vec<Layout>>> {
    let layouts = context.signage.layouts.list().await?;

    Ok(Json(layouts.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/layouts/{id}",
    tag = "layouts",
    params(("id" = String, Path, description = "Layout id")),
    responses(
        (status = 200, body = Layout),
        (status = 404, description = "Layout not found")
    )
)]
async fn layout(
    context: ServerContext,
    Path(layout_id): Path<DocumentId>,
) -> ServerResult<Json<Layout>> {
    let layout = context.signage.layouts.get(&layout_id).await?;

    Ok(Json(layout.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/layouts",
    tag = "layouts",
    request_body = NewLayoutSchema,
    responses(
        (status = 200, body = Layout),
        (status = 400, description = "A placement doesn't fit the grid, or the status bar is invalid")
    )
)]
async fn create_layout(
    context: ServerContext,
    creator: Creator,
    ValidatedJson(body): ValidatedJson<NewLayoutSchema>,
) -> ServerResult<Json<Layout>> {
    let layout = context
        .signage
        .layouts
        .create(body.into(), creator.id())
        .await?;

    Ok(Json(layout.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/layouts/{id}",
    tag = "layouts",
    params(("id" = String, Path, description = "Layout id")),
    request_body = UpdateLayoutSchema,
    responses(
        (status = 200, body = Layout),
        (status = 400, description = "A placement doesn't fit the grid, or the status bar is invalid"),
        (status = 404, description = "Layout not found")
    )
)]
async fn update_layout(
    context: ServerContext,
    Path(layout_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<UpdateLayoutSchema>,
) -> ServerResult<Json<Layout>> {
    let layout = context
        .signage
        .layouts
        .update(&layout_id, body.into())
        .await?;

    Ok(Json(layout.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/layouts/{id}",
    tag = "layouts",
    params(("id" = String, Path, description = "Layout id")),
    responses(
        (status = 200, description = "The layout was deleted"),
        (status = 404, description = "Layout not found")
    )
)]
async fn delete_layout(
    context: ServerContext,
    Path(layout_id): Path<DocumentId>,
) -> ServerResult<()> {
    context.signage.layouts.delete(&layout_id).await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/layouts/{id}/displays",
    tag = "layouts",
    params(("id" = String, Path, description = "Layout id")),
    request_body = DisplayFromLayoutSchema,
    responses(
        (status = 200, body = Display, description = "A new display with copies of the layout's widgets"),
        (status = 404, description = "Layout not found")
    )
)]
async fn create_display_from_layout(
    context: ServerContext,
    creator: Creator,
    Path(layout_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<DisplayFromLayoutSchema>,
) -> ServerResult<Json<Display>> {
    let display = context
        .signage
        .displays
        .create_from_layout(&layout_id, body.name, creator.id())
        .await?;

    Ok(Json(display.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_layouts).post(create_layout))
        .route(
            "/:id",
            get(layout).put(update_layout).delete(delete_layout),
        )
        .route("/:id/displays", post(create_display_from_layout))
}
