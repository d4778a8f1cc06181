//! Notification sink that keeps the catalog in step with the registry.

use crate::error::CatalogResult;
use crate::store::CatalogStore;
use regindex_core::{Event, EventAction};
use std::sync::Arc;
use time::OffsetDateTime;

/// Outcome of a successfully applied batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkReport {
    pub pushed: u64,
    pub deleted: u64,
    /// Events skipped because they target a layer or carry another action.
    pub ignored: u64,
}

/// Writes manifest push/delete events into the catalog.
#[derive(Clone)]
pub struct IndexSink {
    store: Arc<dyn CatalogStore>,
}

impl IndexSink {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Apply a batch in order.
    ///
    /// Stops at the first failing event and returns its error; the events
    /// after it are left unprocessed for the registry to redeliver.
    pub async fn write(&self, events: &[Event]) -> CatalogResult<SinkReport> {
        let mut report = SinkReport::default();

        for (position, event) in events.iter().enumerate() {
            let target = &event.target;
            if !target.is_manifest() {
                report.ignored += 1;
                continue;
            }

            let tag = target.tag();
            match event.action {
                EventAction::Push => {
                    self.store
                        .record_push(
                            &target.repository,
                            tag,
                            &target.digest,
                            &target.url,
                            OffsetDateTime::now_utc(),
                        )
                        .await
                        .inspect_err(|e| {
                            tracing::error!(
                                event_id = %event.id,
                                position,
                                repository = %target.repository,
                                tag,
                                error = %e,
                                "Failed to index pushed tag"
                            )
                        })?;
                    tracing::debug!(repository = %target.repository, tag, digest = %target.digest, "Indexed tag");
                    report.pushed += 1;
                }
                EventAction::Delete => {
                    let existed = self
                        .store
                        .remove_tag(&target.repository, tag)
                        .await
                        .inspect_err(|e| {
                            tracing::error!(
                                event_id = %event.id,
                                position,
                                repository = %target.repository,
                                tag,
                                error = %e,
                                "Failed to remove deleted tag"
                            )
                        })?;
                    tracing::debug!(repository = %target.repository, tag, existed, "Removed tag");
                    report.deleted += 1;
                }
                EventAction::Other => report.ignored += 1,
            }
        }

        Ok(report)
    }

    /// Release the catalog connections.
    pub async fn close(&self) -> CatalogResult<()> {
        tracing::debug!("Index sink close");
        self.store.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use regindex_core::Target;
    use regindex_core::event::MANIFEST_MEDIA_TYPE;

    fn manifest_event(action: EventAction, repository: &str, url: &str) -> Event {
        Event::new(
            action,
            Target {
                media_type: MANIFEST_MEDIA_TYPE.to_string(),
                repository: repository.to_string(),
                digest: "sha256:1111".to_string(),
                url: url.to_string(),
                ..Default::default()
            },
        )
    }

    async fn sink() -> (IndexSink, Arc<dyn CatalogStore>) {
        let store: Arc<dyn CatalogStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
        (IndexSink::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_push_indexes_tag_from_url() {
        let (sink, store) = sink().await;
        let event = manifest_event(
            EventAction::Push,
            "library/app",
            "http://registry/v2/library/app/manifests/v1.2",
        );

        let report = sink.write(&[event]).await.unwrap();
        assert_eq!(report.pushed, 1);

        let tag = store.get_tag("library/app", "v1.2").await.unwrap().unwrap();
        assert_eq!(tag.digest, "sha256:1111");
        assert_eq!(tag.status, "unset");
        assert_eq!(store.count_repositories().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_push_with_slashless_url_indexes_empty_tag() {
        let (sink, store) = sink().await;
        sink.write(&[manifest_event(EventAction::Push, "app", "latest")])
            .await
            .unwrap();

        assert!(store.get_tag("app", "").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_layer_and_other_events_are_ignored() {
        let (sink, store) = sink().await;
        let mut layer = manifest_event(EventAction::Push, "library/app", "/v2/library/app/blobs/x");
        layer.target.media_type = "application/octet-stream".to_string();
        let pull = manifest_event(EventAction::Other, "library/app", "/v2/library/app/manifests/a");

        let report = sink.write(&[layer, pull]).await.unwrap();
        assert_eq!(report.ignored, 2);
        assert_eq!(store.count_repositories().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_tag_and_empty_repository() {
        let (sink, store) = sink().await;
        let url = "http://registry/v2/library/app/manifests/latest";
        sink.write(&[
            manifest_event(EventAction::Push, "library/app", url),
            manifest_event(EventAction::Delete, "library/app", url),
        ])
        .await
        .unwrap();

        assert!(store.get_tag("library/app", "latest").await.unwrap().is_none());
        assert_eq!(store.count_repositories().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_close_shuts_down_store() {
        let (sink, store) = sink().await;
        sink.close().await.unwrap();
        assert!(store.health_check().await.is_err());
    }
}
