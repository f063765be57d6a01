use axum::{
    extract::Path,
    routing::{delete, get, post},
    Json,
};
use signage_core::DocumentId;

use crate::{
    auth::Creator,
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        AppendSlideSchema, NewSlideSchema, NewSlideshowSchema, ReorderSchema, UpdateSlideSchema,
        UpdateSlideshowSchema, ValidatedJson,
    },
    serialized::{PopulatedSlideshow, Slide, Slideshow, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/slideshows",
    tag = "slideshows",
    responses(
        (status = 200, body = Vec<Slideshow>)
    )
)]
async fn list_slideshows(context: ServerContext) -> ServerResult<Json<Vec<Slideshow>>> {
    let slideshows = context.signage.slideshows.list().await?;

    Ok(Json(slideshows.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/slideshows/{id}",
    tag = "slideshows",
    params(("id" = String, Path, description = "Slideshow id")),
    responses(
        (status = 200, body = PopulatedSlideshow),
        (status = 404, description = "Slideshow not found")
    )
)]
async fn slideshow(
    context: ServerContext,
    Path(slideshow_id): Path<DocumentId>,
) -> ServerResult<Json<PopulatedSlideshow>> {
    let signage = &context.signage;
    let resolved = signage.slideshows.get(&slideshow_id).await?;

    Ok(Json(PopulatedSlideshow::new(&resolved, |s| {
        signage.slides.duration(s)
    })))
}

#[utoipa::path(
    post,
    path = "/v1/slideshows",
    tag = "slideshows",
    request_body = NewSlideshowSchema,
    responses(
        (status = 200, body = Slideshow),
        (status = 400, description = "A slide doesn't exist")
    )
)]
async fn create_slideshow(
    context: ServerContext,
    creator: Creator,
    ValidatedJson(body): ValidatedJson<NewSlideshowSchema>,
) -> ServerResult<Json<Slideshow>> {
    let slideshow = context
        .signage
        .slideshows
        .create(body.name, body.slides, creator.id())
        .await?;

    Ok(Json(slideshow.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/slideshows/{id}",
    tag = "slideshows",
    params(("id" = String, Path, description = "Slideshow id")),
    request_body = UpdateSlideshowSchema,
    responses(
        (status = 200, body = Slideshow),
        (status = 400, description = "A slide doesn't exist"),
        (status = 404, description = "Slideshow not found")
    )
)]
async fn update_slideshow(
    context: ServerContext,
    Path(slideshow_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<UpdateSlideshowSchema>,
) -> ServerResult<Json<Slideshow>> {
    let slideshow = context
        .signage
        .slideshows
        .update(&slideshow_id, body.into())
        .await?;

    Ok(Json(slideshow.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/slideshows/{id}",
    tag = "slideshows",
    params(("id" = String, Path, description = "Slideshow id")),
    responses(
        (status = 200, description = "The slideshow was deleted, its slides are kept"),
        (status = 404, description = "Slideshow not found")
    )
)]
async fn delete_slideshow(
    context: ServerContext,
    Path(slideshow_id): Path<DocumentId>,
) -> ServerResult<()> {
    context.signage.slideshows.delete(&slideshow_id).await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/slideshows/{id}/slides",
    tag = "slideshows",
    params(("id" = String, Path, description = "Slideshow id")),
    request_body = AppendSlideSchema,
    responses(
        (status = 200, body = Slideshow),
        (status = 404, description = "Slideshow or slide not found")
    )
)]
async fn append_slide(
    context: ServerContext,
    Path(slideshow_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<AppendSlideSchema>,
) -> ServerResult<Json<Slideshow>> {
    let slideshow = context
        .signage
        .slideshows
        .append_slide(&slideshow_id, &body.slide_id)
        .await?;

    Ok(Json(slideshow.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/slideshows/{id}/slides/{slide_id}",
    tag = "slideshows",
    params(
        ("id" = String, Path, description = "Slideshow id"),
        ("slide_id" = String, Path, description = "Slide id")
    ),
    responses(
        (status = 200, body = Slideshow),
        (status = 404, description = "Slideshow not found, or the slide isn't part of it")
    )
)]
async fn remove_slide(
    context: ServerContext,
    Path((slideshow_id, slide_id)): Path<(DocumentId, DocumentId)>,
) -> ServerResult<Json<Slideshow>> {
    let slideshow = context
        .signage
        .slideshows
        .remove_slide(&slideshow_id, &slide_id)
        .await?;

    Ok(Json(slideshow.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/slideshows/{id}/reorder",
    tag = "slideshows",
    params(("id" = String, Path, description = "Slideshow id")),
    request_body = ReorderSchema,
    responses(
        (status = 200, body = Slideshow),
        (status = 400, description = "An index is out of range"),
        (status = 404, description = "Slideshow not found")
    )
)]
async fn reorder_slides(
    context: ServerContext,
    Path(slideshow_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<ReorderSchema>,
) -> ServerResult<Json<Slideshow>> {
    let slideshow = context
        .signage
        .slideshows
        .reorder(&slideshow_id, body.old_index, body.new_index)
        .await?;

    Ok(Json(slideshow.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/slides",
    tag = "slides",
    responses(
        (status = 200, body = Vec<Slide>)
    )
)]
async fn list_slides(context: ServerContext) -> ServerResult<Json<Vec<Slide>>> {
    let slides = &context.signage.slides;
    let list = slides.list().await?;

    Ok(Json(
        list.iter().map(|s| Slide::new(s, slides.duration(s))).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/slides/{id}",
    tag = "slides",
    params(("id" = String, Path, description = "Slide id")),
    responses(
        (status = 200, body = Slide),
        (status = 404, description = "Slide not found")
    )
)]
async fn slide(context: ServerContext, Path(slide_id): Path<DocumentId>) -> ServerResult<Json<Slide>> {
    let slides = &context.signage.slides;
    let slide = slides.get(&slide_id).await?;

    Ok(Json(Slide::new(&slide, slides.duration(&slide))))
}

#[utoipa::path(
    post,
    path = "/v1/slides",
    tag = "slides",
    request_body = NewSlideSchema,
    responses(
        (status = 200, body = Slide)
    )
)]
async fn create_slide(
    context: ServerContext,
    creator: Creator,
    ValidatedJson(body): ValidatedJson<NewSlideSchema>,
) -> ServerResult<Json<Slide>> {
    let slides = &context.signage.slides;
    let slide = slides.create(body.into(), creator.id()).await?;

    Ok(Json(Slide::new(&slide, slides.duration(&slide))))
}

#[utoipa::path(
    put,
    path = "/v1/slides/{id}",
    tag = "slides",
    params(("id" = String, Path, description = "Slide id")),
    request_body = UpdateSlideSchema,
    responses(
        (status = 200, body = Slide),
        (status = 404, description = "Slide not found")
    )
)]
async fn update_slide(
    context: ServerContext,
    Path(slide_id): Path<DocumentId>,
    ValidatedJson(body): ValidatedJson<UpdateSlideSchema>,
) -> ServerResult<Json<Slide>> {
    let slides = &context.signage.slides;
    let slide = slides.update(&slide_id, body.into()).await?;

    Ok(Json(Slide::new(&slide, slides.duration(&slide))))
}

#[utoipa::path(
    delete,
    path = "/v1/slides/{id}",
    tag = "slides",
    params(("id" = String, Path, description = "Slide id")),
    responses(
        (status = 200, description = "The slide was removed from every slideshow and deleted"),
        (status = 404, description = "Slide not found")
    )
)]
async fn delete_slide(context: ServerContext, Path(slide_id): Path<DocumentId>) -> ServerResult<()> {
    context.signage.slides.delete(&slide_id).await?;

    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_slideshows).post(create_slideshow))
        .route(
            "/:id",
            get(slideshow).put(update_slideshow).delete(delete_slideshow),
        )
        .route("/:id/slides", post(append_slide))
        .route("/:id/slides/:slide_id", delete(remove_slide))
        .route("/:id/reorder", post(reorder_slides))
}

pub fn slides_router() -> Router {
    Router::new()
        .route("/", get(list_slides).post(create_slide))
        .route("/:id", get(slide).put(update_slide).delete(delete_slide))
}
