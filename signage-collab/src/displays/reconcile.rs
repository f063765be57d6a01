use std::collections::HashSet;

use log::{info, warn};
use signage_core::{DocumentId, Position, WidgetData};

use crate::{Database, NewWidget, Result, UpdatedWidget};

/// A widget as a client wants it to exist on a display.
/// Descriptors without an id are created, the rest are updated.
#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub id: Option<DocumentId>,
    pub name: String,
    pub data: WidgetData,
    pub position: Position,
}

/// The outcome of bringing a display's widgets in line with a desired list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// The display's new widget list, in the order of the desired list
    pub widgets: Vec<DocumentId>,
    pub created: Vec<DocumentId>,
    pub updated: Vec<DocumentId>,
    pub deleted: Vec<DocumentId>,
    /// How many descriptors failed to persist and were left out
    pub skipped: usize,
}

/// Creates, updates and deletes widgets so that the widgets behind `current`
/// match `desired`. Per-widget failures are logged and skipped. A failure to
/// delete the stale widgets is returned.
///
/// The display itself is never written, the caller stores [Reconciliation::widgets].
pub async fn reconcile_widgets(
    db: &dyn Database,
    current: &[DocumentId],
    desired: Vec<WidgetDescriptor>,
    creator_id: &str,
) -> Result<Reconciliation> {
    let mut result = Reconciliation::default();

    // Each desired slot resolves to an id, or None if it was skipped
    let mut slots = Vec::with_capacity(desired.len());
    let (to_create, to_update): (Vec<_>, Vec<_>) = desired
        .into_iter()
        .enumerate()
        .partition(|(_, d)| d.id.is_none());

    slots.resize(to_create.len() + to_update.len(), None);

    for (slot, descriptor) in to_create {
        let new_widget = NewWidget {
            name: descriptor.name,
            data: descriptor.data,
            position: descriptor.position,
            creator_id: creator_id.to_string(),
        };

        match db.create_widget(new_widget).await {
            Ok(widget) => {
                result.created.push(widget.id);
                slots[slot] = Some(widget.id);
            }
            Err(e) => {
                warn!("Skipping widget that could not be created: {}", e);
                result.skipped += 1;
            }
        }
    }

    for (slot, descriptor) in to_update {
        let Some(id) = descriptor.id else {
            continue;
        };

        if result.updated.contains(&id) {
            continue;
        }

        let updated_widget = UpdatedWidget {
            id,
            name: Some(descriptor.name),
            data: Some(descriptor.data),
            position: Some(descriptor.position),
        };

        match db.update_widget(updated_widget).await {
            Ok(widget) => {
                result.updated.push(widget.id);
                slots[slot] = Some(widget.id);
            }
            Err(e) => {
                warn!("Skipping widget {} that could not be updated: {}", id, e);
                result.skipped += 1;
            }
        }
    }

    result.widgets = slots.into_iter().flatten().collect();

    let kept: HashSet<_> = result.widgets.iter().collect();
    let mut stale = Vec::new();

    for id in current {
        if !kept.contains(id) && !stale.contains(id) {
            stale.push(*id);
        }
    }

    if !stale.is_empty() {
        db.delete_widgets(&stale).await?;
        result.deleted = stale;
    }

    info!(
        "Reconciled widgets: {} created, {} updated, {} deleted, {} skipped",
        result.created.len(),
        result.updated.len(),
        result.deleted.len(),
        result.skipped
    );

    Ok(result)
}

/// Persists the widgets of a display that is being created.
/// Nothing is written when there is no widget list.
pub async fn create_widgets_for_display(
    db: &dyn Database,
    widgets: Option<Vec<WidgetDescriptor>>,
    creator_id: &str,
) -> Result<Vec<DocumentId>> {
    match widgets {
        Some(widgets) if !widgets.is_empty() => {
            let reconciliation = reconcile_widgets(db, &[], widgets, creator_id).await?;
            Ok(reconciliation.widgets)
        }
        _ => Ok(vec![]),
    }
}

#[cfg(test)]
mod test {
    use signage_core::{AnnouncementData, DocumentId, Position, WidgetData};

    use crate::{Database, Fault, MemoryDatabase, NewWidget};

    use super::{create_widgets_for_display, reconcile_widgets, WidgetDescriptor};

    fn descriptor(id: Option<DocumentId>, name: &str) -> WidgetDescriptor {
        WidgetDescriptor {
            id,
            name: name.to_string(),
            data: WidgetData::Announcement(AnnouncementData {
                title: None,
                text: format!("{} text", name),
                color: None,
            }),
            position: Position::default(),
        }
    }

    async fn existing(db: &MemoryDatabase, name: &str) -> DocumentId {
        db.create_widget(NewWidget {
            name: name.to_string(),
            data: WidgetData::Empty,
            position: Position::default(),
            creator_id: "admin".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn creates_updates_and_deletes() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;
        let b = existing(&db, "b").await;

        let result = reconcile_widgets(
            &db,
            &[a, b],
            vec![descriptor(Some(a), "a2"), descriptor(None, "c")],
            "alice",
        )
        .await
        .unwrap();

        assert_eq!(result.created.len(), 1);
        assert_eq!(result.updated, vec![a]);
        assert_eq!(result.deleted, vec![b]);
        assert_eq!(result.widgets, vec![a, result.created[0]]);

        assert!(db.widget_by_id(&b).await.unwrap_err().is_not_found());
        assert_eq!(db.widget_by_id(&a).await.unwrap().name, "a2");

        let created = db.widget_by_id(&result.created[0]).await.unwrap();
        assert_eq!(created.creator_id, "alice");
    }

    #[tokio::test]
    async fn an_empty_desired_list_deletes_everything() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;

        let result = reconcile_widgets(&db, &[a], vec![], "admin").await.unwrap();

        assert!(result.widgets.is_empty());
        assert_eq!(result.deleted, vec![a]);
        assert!(db.list_widgets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_in_desired_order() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;
        let b = existing(&db, "b").await;

        let result = reconcile_widgets(
            &db,
            &[a, b],
            vec![
                descriptor(None, "new"),
                descriptor(Some(b), "b"),
                descriptor(Some(a), "a"),
            ],
            "admin",
        )
        .await
        .unwrap();

        assert_eq!(result.widgets, vec![result.created[0], b, a]);
        assert!(result.deleted.is_empty());
    }

    #[tokio::test]
    async fn reconciling_twice_changes_nothing() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;

        let first = reconcile_widgets(
            &db,
            &[a],
            vec![descriptor(Some(a), "a"), descriptor(None, "b")],
            "admin",
        )
        .await
        .unwrap();

        let desired: Vec<_> = first
            .widgets
            .iter()
            .map(|id| descriptor(Some(*id), "same"))
            .collect();

        let second = reconcile_widgets(&db, &first.widgets, desired, "admin")
            .await
            .unwrap();

        assert_eq!(second.widgets, first.widgets);
        assert!(second.created.is_empty());
        assert!(second.deleted.is_empty());
        assert_eq!(db.list_widgets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn every_kept_id_was_current_or_created() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;
        let b = existing(&db, "b").await;
        let c = existing(&db, "c").await;
        let current = vec![a, b, c];

        let result = reconcile_widgets(
            &db,
            &current,
            vec![
                descriptor(Some(c), "c"),
                descriptor(None, "d"),
                descriptor(Some(a), "a"),
            ],
            "admin",
        )
        .await
        .unwrap();

        for id in &result.widgets {
            assert!(current.contains(id) || result.created.contains(id));
        }

        for id in &current {
            assert!(result.widgets.contains(id) || result.deleted.contains(id));
        }
    }

    #[tokio::test]
    async fn updates_to_missing_widgets_are_skipped() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;
        let ghost = DocumentId::generate();

        let result = reconcile_widgets(
            &db,
            &[a],
            vec![descriptor(Some(ghost), "ghost"), descriptor(Some(a), "a")],
            "admin",
        )
        .await
        .unwrap();

        assert_eq!(result.widgets, vec![a]);
        assert_eq!(result.skipped, 1);
        assert!(result.deleted.is_empty());
    }

    #[tokio::test]
    async fn failed_creates_are_skipped() {
        let db = MemoryDatabase::new();

        db.inject_fault(Fault::CreateWidget {
            name: "broken".to_string(),
        });

        let result = reconcile_widgets(
            &db,
            &[],
            vec![descriptor(None, "broken"), descriptor(None, "fine")],
            "admin",
        )
        .await
        .unwrap();

        assert_eq!(result.widgets.len(), 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(db.widget_by_id(&result.widgets[0]).await.unwrap().name, "fine");
    }

    #[tokio::test]
    async fn a_failed_update_deletes_the_stale_widget() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;

        db.inject_fault(Fault::UpdateWidget { id: a });

        let result = reconcile_widgets(&db, &[a], vec![descriptor(Some(a), "a")], "admin")
            .await
            .unwrap();

        assert!(result.widgets.is_empty());
        assert_eq!(result.deleted, vec![a]);
    }

    #[tokio::test]
    async fn failed_deletes_are_returned() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;

        db.inject_fault(Fault::DeleteWidgets);

        let result = reconcile_widgets(&db, &[a], vec![], "admin").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn repeated_ids_are_updated_once() {
        let db = MemoryDatabase::new();
        let a = existing(&db, "a").await;

        let result = reconcile_widgets(
            &db,
            &[a],
            vec![descriptor(Some(a), "first"), descriptor(Some(a), "second")],
            "admin",
        )
        .await
        .unwrap();

        assert_eq!(result.widgets, vec![a]);
        assert_eq!(result.updated, vec![a]);
        assert_eq!(db.widget_by_id(&a).await.unwrap().name, "first");
    }

    #[tokio::test]
    async fn no_widget_list_creates_nothing() {
        let db = MemoryDatabase::new();

        db.inject_fault(Fault::DeleteWidgets);

        let widgets = create_widgets_for_display(&db, None, "admin").await.unwrap();

        assert!(widgets.is_empty());
        assert!(db.list_widgets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn creating_for_a_display_persists_every_widget() {
        let db = MemoryDatabase::new();

        let widgets = create_widgets_for_display(
            &db,
            Some(vec![descriptor(None, "a"), descriptor(None, "b")]),
            "admin",
        )
        .await
        .unwrap();

        assert_eq!(widgets.len(), 2);
        assert_eq!(db.widgets_by_ids(&widgets).await.unwrap().len(), 2);
    }
}
