use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use signage_core::{Display, DocumentId, Layout, Slide, Slideshow, Widget};
use sqlx::{postgres::PgPoolOptions, query, query_scalar, types::Json, Error as SqlxError, PgPool};

use super::{
    order_by_ids, Database, DatabaseError, Document, IntoDatabaseError, NewDisplay, NewLayout,
    NewSlide, NewSlideshow, NewWidget, Result, UpdatedDisplay, UpdatedLayout, UpdatedSlide,
    UpdatedSlideshow, UpdatedWidget,
};

/// A postgres database implementation for signage.
///
/// Every document is stored whole as a JSONB row in the `documents` table,
/// keyed by collection and id.
pub struct PgDatabase {
    pool: PgPool,
}

/// A document that can round trip through a JSONB column
trait Stored: Document + Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {}

impl<T> Stored for T where
    T: Document + Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| e.any())?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    async fn get<T: Stored>(&self, id: &DocumentId) -> Result<T> {
        query_scalar::<_, Json<T>>("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map(|Json(document)| document)
            .map_err(|e| e.not_found_or(T::RESOURCE, id))
    }

    async fn all<T: Stored>(&self) -> Result<Vec<T>> {
        self.all_where("TRUE", None).await
    }

    /// Lists documents of a collection matching `clause`, which may refer to `$2`.
    /// The clause is always a fixed string, never user input.
    async fn all_where<T: Stored>(&self, clause: &str, argument: Option<String>) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT body FROM documents WHERE collection = $1 AND {} ORDER BY seq",
            clause
        );

        let mut statement = query_scalar::<_, Json<T>>(&sql).bind(T::COLLECTION);

        if let Some(argument) = argument {
            statement = statement.bind(argument);
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| e.any())?;
        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn by_ids<T: Stored>(&self, ids: &[DocumentId]) -> Result<Vec<T>> {
        let keys: Vec<_> = ids.iter().map(|id| id.to_string()).collect();

        let rows = query_scalar::<_, Json<T>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = ANY($2)",
        )
        .bind(T::COLLECTION)
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let found = rows.into_iter().map(|Json(document)| document).collect();
        Ok(order_by_ids(ids, found))
    }

    async fn insert<T: Stored>(&self, new: T::New) -> Result<T> {
        let document = T::create(new, DocumentId::generate(), Utc::now());

        query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(T::COLLECTION)
            .bind(document.id().to_string())
            .bind(Json(&document))
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(document)
    }

    /// Re-reads the stored document under a row lock, applies the update and writes it back.
    async fn update<T: Stored>(&self, id: &DocumentId, updated: T::Updated) -> Result<T> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        let Json(mut document) = query_scalar::<_, Json<T>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(T::COLLECTION)
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.not_found_or(T::RESOURCE, id))?;

        document.apply(updated, Utc::now());

        query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.to_string())
            .bind(Json(&document))
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())?;
        Ok(document)
    }

    async fn remove<T: Stored>(&self, id: &DocumentId) -> Result<()> {
        let result = query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(T::RESOURCE, id));
        }

        Ok(())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn display_by_id(&self, display_id: &DocumentId) -> Result<Display> {
        self.get(display_id).await
    }

    async fn list_displays(&self) -> Result<Vec<Display>> {
        self.all().await
    }

    async fn displays_with_widget(&self, widget_id: &DocumentId) -> Result<Vec<Display>> {
        self.all_where("body->'widgets' ? $2", Some(widget_id.to_string()))
            .await
    }

    async fn create_display(&self, new_display: NewDisplay) -> Result<Display> {
        self.insert::<Display>(new_display).await
    }

    async fn update_display(&self, updated_display: UpdatedDisplay) -> Result<Display> {
        self.update::<Display>(&updated_display.id.clone(), updated_display)
            .await
    }

    async fn delete_display(&self, display_id: &DocumentId) -> Result<()> {
        self.remove::<Display>(display_id).await
    }

    async fn widget_by_id(&self, widget_id: &DocumentId) -> Result<Widget> {
        self.get(widget_id).await
    }

    async fn widgets_by_ids(&self, widget_ids: &[DocumentId]) -> Result<Vec<Widget>> {
        self.by_ids(widget_ids).await
    }

    async fn list_widgets(&self) -> Result<Vec<Widget>> {
        self.all().await
    }

    async fn widgets_with_slideshow(&self, slideshow_id: &DocumentId) -> Result<Vec<Widget>> {
        self.all_where(
            "body->>'type' = 'slideshow' AND body->'data'->>'slideshow_id' = $2",
            Some(slideshow_id.to_string()),
        )
        .await
    }

    async fn create_widget(&self, new_widget: NewWidget) -> Result<Widget> {
        self.insert::<Widget>(new_widget).await
    }

    async fn update_widget(&self, updated_widget: UpdatedWidget) -> Result<Widget> {
        self.update::<Widget>(&updated_widget.id.clone(), updated_widget)
            .await
    }

    async fn delete_widgets(&self, widget_ids: &[DocumentId]) -> Result<u64> {
        let keys: Vec<_> = widget_ids.iter().map(|id| id.to_string()).collect();

        query("DELETE FROM documents WHERE collection = $1 AND id = ANY($2)")
            .bind(<Widget as Document>::COLLECTION)
            .bind(keys)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| e.any())
    }

    async fn slideshow_by_id(&self, slideshow_id: &DocumentId) -> Result<Slideshow> {
        self.get(slideshow_id).await
    }

    async fn list_slideshows(&self) -> Result<Vec<Slideshow>> {
        self.all().await
    }

    async fn slideshows_with_slide(&self, slide_id: &DocumentId) -> Result<Vec<Slideshow>> {
        self.all_where("body->'slides' ? $2", Some(slide_id.to_string()))
            .await
    }

    async fn create_slideshow(&self, new_slideshow: NewSlideshow) -> Result<Slideshow> {
        self.insert::<Slideshow>(new_slideshow).await
    }

    async fn update_slideshow(&self, updated_slideshow: UpdatedSlideshow) -> Result<Slideshow> {
        self.update::<Slideshow>(&updated_slideshow.id.clone(), updated_slideshow)
            .await
    }

    async fn delete_slideshow(&self, slideshow_id: &DocumentId) -> Result<()> {
        self.remove::<Slideshow>(slideshow_id).await
    }

    async fn slide_by_id(&self, slide_id: &DocumentId) -> Result<Slide> {
        self.get(slide_id).await
    }

    async fn slides_by_ids(&self, slide_ids: &[DocumentId]) -> Result<Vec<Slide>> {
        self.by_ids(slide_ids).await
    }

    async fn list_slides(&self) -> Result<Vec<Slide>> {
        self.all().await
    }

    async fn create_slide(&self, new_slide: NewSlide) -> Result<Slide> {
        self.insert::<Slide>(new_slide).await
    }

    async fn update_slide(&self, updated_slide: UpdatedSlide) -> Result<Slide> {
        self.update::<Slide>(&updated_slide.id.clone(), updated_slide)
            .await
    }

    async fn delete_slide(&self, slide_id: &DocumentId) -> Result<()> {
        self.remove::<Slide>(slide_id).await
    }

    async fn layout_by_id(&self, layout_id: &DocumentId) -> Result<Layout> {
        self.get(layout_id).await
    }

    async fn list_layouts(&self) -> Result<Vec<Layout>> {
        self.all().await
    }

    async fn create_layout(&self, new_layout: NewLayout) -> Result<Layout> {
        self.insert::<Layout>(new_layout).await
    }

    async fn update_layout(&self, updated_layout: UpdatedLayout) -> Result<Layout> {
        self.update::<Layout>(&updated_layout.id.clone(), updated_layout)
            .await
    }

    async fn delete_layout(&self, layout_id: &DocumentId) -> Result<()> {
        self.remove::<Layout>(layout_id).await
    }
}

trait NotFoundOr {
    fn not_found_or(self, resource: &'static str, id: &DocumentId) -> DatabaseError;
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }
}

impl NotFoundOr for SqlxError {
    fn not_found_or(self, resource: &'static str, id: &DocumentId) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::not_found(resource, id),
            e => e.any(),
        }
    }
}
