use axum::{extract::Path, routing::get, Json};
use signage_collab::{WidgetChanges, WidgetDraft};
use signage_core::{DocumentId, WidgetData};

use crate::{
    auth::Creator,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewWidgetSchema, UpdateWidgetSchema, ValidatedJson},
    serialized::{ToSerialized, Widget},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/widgets",
    tag = "widgets",
    responses(
        (status = 200, body = Vec<Widget>)
    )
)]
async fn list_widgets(context: ServerContext) -> ServerResult<Json<Vec<Widget>>> {
    let widgets = context.signage.widgets.list().await?;

    Ok(Json(widgets.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/widgets/{id}",
    tag = "widgets",
    params(("id" = String, Path, description = "Widget id")),
    responses(
        (status = 200, body = Widget),
        (status = 404, description = "Widget not found")
    )
)]
async fn widget(
    context: ServerContext,
    Path(widget_id): Path<DocumentId>,
) -> ServerResult<Json<Widget>> {
    let widget = context.signage.widgets.get(&widget_id).await?;

    Ok(Json(widget.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/widgets",
    tag = "widgets",
    request_body = NewWidgetSchema,
    responses(
        (status = 200, body = Widget),
        (status = 400, description = "The widget's data doesn't fit its type")
    )
)]
async fn create_widget(
    context: ServerContext,
    creator: Creator,
    ValidatedJson(body): ValidatedJson<NewWidgetSchema>,
) -> ServerResult<Json<Widget>> {
    let display_id = body.display_id;
    let descriptor = body.widget.into_descriptor()?;

    let widget = context
        .signage
        .widgets
        .create(
            WidgetDraft {
                name: descriptor.name,
                data: descriptor.data,
                position: descriptor.position,
                display_id,
            },
            creator.id(),
        )
        .await?;

    Ok(Json(widget.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/widgets/{id}",
    tag = "widgets",
    params(("id" = String, Path, description = "Widget id")),
    request_body = UpdateWidgetSchema,
    responses(
        (status = 200, body = Widget),
        (status = 400, description = "The widget's data doesn't fit its type"),
        (status = 404, description = "Widget not found")
    )
)]
async fn update_widget(
    context: ServerContext,
    Path(widget_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<UpdateWidgetSchema>,
) -> ServerResult<Json<Widget>> {
    let current = context.signage.widgets.get(&widget_id).await?;

    // A new type or payload is checked against whichever of the two wasn't sent
    let data = if body.kind.is_some() || body.data.is_some() {
        let kind = body.kind.unwrap_or(current.kind());
        let value = body.data.clone().unwrap_or_else(|| current.data.to_value());

        Some(WidgetData::from_parts(kind, value)?)
    } else {
        None
    };

    let changes = WidgetChanges {
        position: body.position(current.position),
        name: body.name,
        data,
    };

    let widget = context.signage.widgets.update(&widget_id, changes).await?;

    Ok(Json(widget.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/widgets/{id}",
    tag = "widgets",
    params(("id" = String, Path, description = "Widget id")),
    responses(
        (status = 200, description = "The widget was removed from its displays and deleted"),
        (status = 404, description = "Widget not found")
    )
)]
async fn delete_widget(
    context: ServerContext,
    Path(widget_id): Path<DocumentId>,
) -> ServerResult<()> {
    context.signage.widgets.delete(&widget_id).await?;

    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_widgets).post(create_widget))
        .route("/:id", get(widget).put(update_widget).delete(delete_widget))
}
