use std::sync::Arc;

use snapfleet_common::TagFilter;
use snapfleet_orchestrator::Reporter;
use snapfleet_provider::FleetSeed;

fn reporter() -> Reporter {
    let seed = FleetSeed::from_yaml(
        r#"
instances:
  - id: i-dev
    tags: { Project: dev, Name: web-1 }
    volumes:
      - id: vol-1
        size_gib: 20
        encrypted: true
        snapshots:
          - id: snap-t3
            state: pending
            started_at: 2026-08-03T00:00:00Z
          - id: snap-t2
            state: completed
            started_at: 2026-08-02T00:00:00Z
          - id: snap-t1
            state: completed
            started_at: 2026-08-01T00:00:00Z
  - id: i-prod
    tags: { Project: prod }
    volumes:
      - id: vol-2
"#,
    )
    .unwrap();
    Reporter::new(Arc::new(seed.into_provider()))
}

#[tokio::test]
async fn default_snapshot_listing_truncates_after_first_completed() -> anyhow::Result<()> {
    let reporter = reporter();

    let rows = reporter.list_snapshots(&TagFilter::default(), false).await?;
    let ids: Vec<_> = rows.iter().map(|r| r.snapshot.id.as_str()).collect();
    // Latest completed plus the pending one before it; older history cut.
    assert_eq!(ids, vec!["snap-t3", "snap-t2"]);

    let rows = reporter.list_snapshots(&TagFilter::default(), true).await?;
    let ids: Vec<_> = rows.iter().map(|r| r.snapshot.id.as_str()).collect();
    assert_eq!(ids, vec!["snap-t3", "snap-t2", "snap-t1"]);

    Ok(())
}

#[tokio::test]
async fn snapshot_rows_carry_the_owning_instance() -> anyhow::Result<()> {
    let reporter = reporter();

    let rows = reporter.list_snapshots(&TagFilter::default(), false).await?;
    assert!(rows.iter().all(|r| r.instance_id == "i-dev"));
    assert!(rows.iter().all(|r| r.snapshot.volume_id == "vol-1"));

    Ok(())
}

#[tokio::test]
async fn volume_listing_follows_the_selection() -> anyhow::Result<()> {
    let reporter = reporter();

    let all = reporter.list_volumes(&TagFilter::default()).await?;
    assert_eq!(all.len(), 2);

    let dev = reporter
        .list_volumes(&TagFilter::new(Some("dev".into()), None))
        .await?;
    assert_eq!(dev.len(), 1);
    assert_eq!(dev[0].id, "vol-1");
    assert!(dev[0].encrypted);

    let instances = reporter
        .list_instances(&TagFilter::new(Some("prod".into()), None))
        .await?;
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].id, "i-prod");

    Ok(())
}
