//! Tests for the cart service.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::cart::testing::{FakeCatalog, MemoryStorage};
    use crate::cart::{CartService, CartStore, RefreshOutcome};
    use crate::popularity::PopularityTracker;

    fn service_with(catalog: &Arc<FakeCatalog>, storage: &MemoryStorage) -> CartService {
        let store = CartStore::open(Box::new(storage.clone()));
        let tracker = PopularityTracker::with_enabled(catalog.clone(), true);
        CartService::new(store, catalog.clone(), tracker)
    }

    fn detail_ids(view: &crate::cart::DetailView) -> Vec<&str> {
        view.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_then_details_are_most_recent_first() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A", "B", "C"]));
        let service = service_with(&catalog, &MemoryStorage::new());

        for id in ["A", "B", "C"] {
            assert!(service.add(id).await);
            // Keep timestamps distinct even on coarse clocks
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        assert_eq!(service.list().await, vec!["C", "B", "A"]);
        let view = service.details().await;
        assert_eq!(detail_ids(&view), vec!["C", "B", "A"]);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_noop() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        let service = service_with(&catalog, &MemoryStorage::new());

        assert!(service.add("A").await);
        assert!(!service.add("A").await);
        assert_eq!(service.len().await, 1);
        // No extra refresh for the no-op
        assert_eq!(catalog.detail_call_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let catalog = Arc::new(FakeCatalog::new());
        let service = service_with(&catalog, &MemoryStorage::new());

        assert!(!service.remove("ghost").await);
        assert!(!service.contains("ghost").await);
        assert_eq!(catalog.detail_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mutations_visible_before_refresh_completes() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        let service = service_with(&catalog, &MemoryStorage::new());
        let release = catalog.gate_detail_call(1);

        let adding = {
            let service = service.clone();
            tokio::spawn(async move { service.add("A").await })
        };
        catalog.wait_for_detail_calls(1).await;

        assert!(service.contains("A").await);
        assert!(service.details().await.loading);

        let _ = release.send(());
        assert!(adding.await.unwrap());
        assert!(!service.details().await.loading);
    }

    #[tokio::test]
    async fn test_validate_prunes_missing_and_persists() {
        let storage = MemoryStorage::new();
        {
            let mut store = CartStore::open(Box::new(storage.clone()));
            store.add_at("A", 1);
            store.add_at("gone", 2);
            store.add_at("B", 3);
        }
        let catalog = Arc::new(FakeCatalog::with_products(&["A", "B"]));
        let service = service_with(&catalog, &storage);

        assert_eq!(service.validate_on_load().await, vec!["gone".to_string()]);
        assert_eq!(service.list().await, vec!["B", "A"]);

        let persisted = CartStore::open(Box::new(storage.clone()));
        assert_eq!(persisted.list(), vec!["B", "A"]);

        // Only once per service
        assert!(service.validate_on_load().await.is_empty());
        assert_eq!(catalog.existence_call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_validation_prunes_nothing() {
        let storage = MemoryStorage::new();
        CartStore::open(Box::new(storage.clone())).add_at("A", 1);
        let catalog = Arc::new(FakeCatalog::new());
        catalog.fail_existence(true);
        let service = service_with(&catalog, &storage);

        assert!(service.validate_on_load().await.is_empty());
        assert_eq!(service.list().await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_items_added_during_validation_are_kept() {
        let storage = MemoryStorage::new();
        CartStore::open(Box::new(storage.clone())).add_at("old", 1);
        // Neither id exists remotely
        let catalog = Arc::new(FakeCatalog::new());
        let service = service_with(&catalog, &storage);
        let release = catalog.gate_existence();

        let validating = {
            let service = service.clone();
            tokio::spawn(async move { service.validate_on_load().await })
        };
        catalog.wait_for_existence_calls(1).await;

        assert!(service.add("fresh").await);
        let _ = release.send(());

        assert_eq!(validating.await.unwrap(), vec!["old".to_string()]);
        assert_eq!(service.list().await, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_start_validates_then_loads_details() {
        let storage = MemoryStorage::new();
        {
            let mut store = CartStore::open(Box::new(storage.clone()));
            store.add_at("A", 1);
            store.add_at("gone", 2);
        }
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        let service = service_with(&catalog, &storage);

        assert_eq!(service.start().await, RefreshOutcome::Applied(1));
        assert_eq!(catalog.detail_calls(), vec![vec!["A".to_string()]]);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_follow_the_latest() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A", "B"]));
        let service = service_with(&catalog, &MemoryStorage::new());
        let release_first = catalog.gate_detail_call(1);

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.add("A").await })
        };
        catalog.wait_for_detail_calls(1).await;

        // Second mutation finishes while the first fetch is still pending
        assert!(service.add("B").await);
        let _ = release_first.send(());
        assert!(first.await.unwrap());

        let view = service.details().await;
        let mut ids = detail_ids(&view);
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(catalog.detail_call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_reported_as_loading() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        let service = service_with(&catalog, &MemoryStorage::new());

        assert!(service.add("A").await);
        assert!(service.add("gone").await);

        let view = service.details().await;
        assert_eq!(detail_ids(&view), vec!["A"]);
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert!(service.contains("gone").await);
    }

    #[tokio::test]
    async fn test_removing_last_item_clears_details_without_fetch() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        let service = service_with(&catalog, &MemoryStorage::new());

        service.add("A").await;
        assert!(service.remove("A").await);

        let view = service.details().await;
        assert!(view.items.is_empty());
        assert!(!view.loading);
        assert_eq!(catalog.detail_call_count(), 1);
    }

    #[tokio::test]
    async fn test_detail_failure_keeps_cart_contents() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        catalog.fail_details(true);
        let service = service_with(&catalog, &MemoryStorage::new());

        assert!(service.add("A").await);
        assert!(service.contains("A").await);

        let view = service.details().await;
        assert!(view.items.is_empty());
        assert!(view.error.is_some());
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_popularity_failure_does_not_affect_cart() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A"]));
        catalog.fail_popularity(true);
        let service = service_with(&catalog, &MemoryStorage::new());

        assert!(service.add("A").await);
        // Let the detached ping run
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(catalog.popularity_calls(), vec!["A".to_string()]);
        assert!(service.contains("A").await);
        assert_eq!(detail_ids(&service.details().await), vec!["A"]);
    }

    #[tokio::test]
    async fn test_persisted_cart_survives_restart() {
        let catalog = Arc::new(FakeCatalog::with_products(&["A", "B"]));
        let storage = MemoryStorage::new();
        {
            let service = service_with(&catalog, &storage);
            service.add("A").await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            service.add("B").await;
        }

        let restarted = service_with(&catalog, &storage);
        assert_eq!(restarted.list().await, vec!["B", "A"]);
    }
}
