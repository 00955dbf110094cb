//! # Concurrency Tests
//!
//! Scans race each other and race the close transition on a multi-threaded
//! runtime:
//!
//! ```text
//! N terminals ──same AWB──→ [Manifest]      one SUCCESS, rest SUCCESS_DUPLICATE
//! N manifests ←─same AWB── terminals         one SUCCESS, rest ALREADY_MANIFESTED
//! scans ──┬──→ [Manifest] ←── CLOSED         nothing attaches after the close
//!         └── totals converge on a final recompute
//! ```

#[cfg(test)]
mod tests {
    use crate::support::World;
    use futures::future::join_all;
    use lm_01_manifest_engine::{
        ManifestApi, ManifestStatus, ScanClassification, ScanOutcome, ScanRequest,
    };
    use std::sync::Arc;

    async fn scan_all(world: &World, requests: Vec<ScanRequest>) -> Vec<ScanOutcome> {
        let handles = requests.into_iter().map(|request| {
            let engine = Arc::clone(&world.engine);
            tokio::spawn(async move { engine.ingest_scan(request).await })
        });
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("task panicked").expect("scan failed"))
            .collect()
    }

    fn count(outcomes: &[ScanOutcome], classification: ScanClassification) -> usize {
        outcomes
            .iter()
            .filter(|outcome| outcome.classification == classification)
            .count()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_scan_from_many_terminals() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;
        world.book("123-45678901", 2, 5.0);

        let requests = (0..16)
            .map(|_| ScanRequest::new(world.org, manifest.id, "123-45678901"))
            .collect();
        let outcomes = scan_all(&world, requests).await;

        assert_eq!(count(&outcomes, ScanClassification::Success), 1);
        assert_eq!(count(&outcomes, ScanClassification::SuccessDuplicate), 15);
        assert_eq!(world.manifests.items_in(manifest.id), 1);
        assert_eq!(world.audit.count_for(manifest.id), 16);

        let stored = world.engine.get_manifest(world.org, manifest.id).await?;
        assert_eq!(stored.totals.shipment_count, 1);
        assert_eq!(stored.totals.package_count, 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_shipment_many_manifests() -> anyhow::Result<()> {
        let world = World::new();
        let shipment = world.book("123-45678901", 1, 1.0);
        let mut manifests = Vec::new();
        for _ in 0..8 {
            manifests.push(world.open_manifest().await?);
        }

        let requests = manifests
            .iter()
            .map(|manifest| ScanRequest::new(world.org, manifest.id, "12345678901"))
            .collect();
        let outcomes = scan_all(&world, requests).await;

        assert_eq!(count(&outcomes, ScanClassification::Success), 1);
        assert_eq!(count(&outcomes, ScanClassification::AlreadyManifested), 7);

        let holders: Vec<_> = manifests
            .iter()
            .filter(|manifest| world.manifests.items_in(manifest.id) == 1)
            .collect();
        assert_eq!(holders.len(), 1);

        let linked = world.shipments.snapshot(shipment.id).expect("stored");
        assert_eq!(linked.manifest_id, Some(holders[0].id));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_races_scans() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;
        let awbs: Vec<String> = (0..24).map(|n| format!("500-{n:08}")).collect();
        for awb in &awbs {
            world.book(awb, 1, 2.0);
        }

        let close = {
            let engine = Arc::clone(&world.engine);
            let org = world.org;
            let manifest_id = manifest.id;
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                engine
                    .transition_status(org, manifest_id, ManifestStatus::Closed, None)
                    .await
            })
        };
        let requests = awbs
            .iter()
            .map(|awb| ScanRequest::new(world.org, manifest.id, awb.as_str()))
            .collect();
        let outcomes = scan_all(&world, requests).await;
        let closed = close.await.expect("task panicked")?;
        assert_eq!(closed.status, ManifestStatus::Closed);

        let attached = count(&outcomes, ScanClassification::Success);
        let refused = count(&outcomes, ScanClassification::ManifestClosed);
        assert_eq!(attached + refused, awbs.len());
        assert_eq!(world.manifests.items_in(manifest.id), attached);

        // Scans after the close never attach
        let late = world.scan(manifest.id, &awbs[0]).await?;
        assert!(matches!(
            late.classification,
            ScanClassification::ManifestClosed
        ));
        assert_eq!(world.manifests.items_in(manifest.id), attached);

        let totals = world.engine.recompute_totals(manifest.id).await?;
        assert_eq!(totals.shipment_count as usize, attached);
        assert_eq!(totals.package_count as usize, attached);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_recomputes_converge() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;
        for n in 0..10 {
            let awb = format!("700-{n:08}");
            world.book(&awb, 3, 1.5);
            world.scan(manifest.id, &awb).await?;
        }

        let handles = (0..8).map(|_| {
            let engine = Arc::clone(&world.engine);
            let manifest_id = manifest.id;
            tokio::spawn(async move { engine.recompute_totals(manifest_id).await })
        });
        for joined in join_all(handles).await {
            let totals = joined.expect("task panicked")?;
            assert_eq!(totals.shipment_count, 10);
        }

        let stored = world.engine.get_manifest(world.org, manifest.id).await?;
        assert_eq!(stored.totals.shipment_count, 10);
        assert_eq!(stored.totals.package_count, 30);
        assert_eq!(stored.totals.total_weight_kg, 15.0);
        Ok(())
    }
}
