//! Integration tests for the retention sweep

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{donor_id, fake_donor, Harness, RecordingDispatcher};
use donorvault::adapters::database::DonorStore;
use donorvault::adapters::storage::FileStorage;
use donorvault::anonymization::{effective_dry_run, AgeUnit, RetentionPolicy, RetentionSweep};
use donorvault::config::Environment;
use donorvault::core::tasks::{InlineDispatcher, Job, TaskDispatcher};
use std::sync::Arc;

#[tokio::test]
async fn test_only_old_donors_are_dispatched() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let harness = Harness::new();

    // 1 and 2 are past the two year period, 3 is one day short of it
    harness
        .insert(&fake_donor(1, &harness.codecs, now - Duration::days(1000)))
        .await;
    harness
        .insert(&fake_donor(2, &harness.codecs, now - Duration::days(800)))
        .await;
    harness
        .insert(&fake_donor(3, &harness.codecs, now - Duration::days(729)))
        .await;
    harness
        .insert(&fake_donor(4, &harness.codecs, now - Duration::days(5)))
        .await;

    // Already anonymized donors are not enumerated again
    harness
        .insert(&fake_donor(5, &harness.codecs, now - Duration::days(1200)))
        .await;
    harness.engine.remove_personal_data(donor_id(5)).await.unwrap();

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let summary = RetentionSweep::new(
        harness.store(),
        dispatcher.clone(),
        RetentionPolicy::default(),
        100,
    )
    .run(now)
    .await
    .unwrap();

    assert_eq!(summary.records_matched, 2);
    assert_eq!(
        dispatcher.jobs().await,
        vec![Job::AnonymizeDonors(vec![donor_id(1), donor_id(2)])]
    );
}

#[tokio::test]
async fn test_dry_run_counts_without_dispatching() {
    let now = Utc::now();
    let harness = Harness::new();
    for id in 1..=7 {
        harness
            .insert(&fake_donor(id, &harness.codecs, now - Duration::days(900)))
            .await;
    }

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let summary = RetentionSweep::new(
        harness.store(),
        dispatcher.clone(),
        RetentionPolicy::default(),
        3,
    )
    .dry_run(true)
    .run(now)
    .await
    .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.records_matched, 7);
    assert_eq!(summary.batches_dispatched, 0);
    assert!(dispatcher.jobs().await.is_empty());
    for id in 1..=7 {
        let stored = harness.store.get_donor(donor_id(id)).await.unwrap().unwrap();
        assert!(!stored.is_anonymized());
    }
}

#[tokio::test]
async fn test_short_period_sweep() {
    let now = Utc::now();
    let harness = Harness::new();
    harness
        .insert(&fake_donor(1, &harness.codecs, now - Duration::minutes(30)))
        .await;
    harness
        .insert(&fake_donor(2, &harness.codecs, now - Duration::minutes(2)))
        .await;

    let dispatcher = Arc::new(RecordingDispatcher::default());
    RetentionSweep::new(
        harness.store(),
        dispatcher.clone(),
        RetentionPolicy::new(AgeUnit::Minutes, 10),
        10,
    )
    .run(now)
    .await
    .unwrap();

    assert_eq!(
        dispatcher.jobs().await,
        vec![Job::AnonymizeDonors(vec![donor_id(1)])]
    );
}

#[tokio::test]
async fn test_end_to_end_anonymizes_old_donors() {
    let now = Utc::now();
    let harness = Harness::new();
    for id in 1..=6 {
        let age = if id % 2 == 0 { 900 } else { 30 };
        harness
            .insert(&fake_donor(id, &harness.codecs, now - Duration::days(age)))
            .await;
    }

    let dispatcher: Arc<dyn TaskDispatcher> =
        Arc::new(InlineDispatcher::new(Arc::clone(&harness.runner)));
    RetentionSweep::new(
        harness.store(),
        Arc::clone(&dispatcher),
        RetentionPolicy::default(),
        2,
    )
    .run(now)
    .await
    .unwrap();
    let drained = dispatcher.drain().await.unwrap();

    assert!(drained.is_successful());
    assert_eq!(drained.records.updated, 3);

    for id in 1..=6 {
        let stored = harness.store.get_donor(donor_id(id)).await.unwrap().unwrap();
        assert_eq!(stored.is_anonymized(), id % 2 == 0, "donor {id}");
        if stored.is_anonymized() {
            assert_eq!(stored.email, "");
            let document = format!("donation-forms/2024/{id}_form.pdf");
            assert!(!harness.storage.exists(&document).await.unwrap());
        }
    }
}

#[test]
fn test_non_default_period_forced_dry_in_production() {
    let short = RetentionPolicy::new(AgeUnit::Months, 6);
    assert!(effective_dry_run(Environment::Production, &short, false));
    assert!(!effective_dry_run(Environment::Staging, &short, false));
    assert!(!effective_dry_run(
        Environment::Production,
        &RetentionPolicy::default(),
        false
    ));
}
