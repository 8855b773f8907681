mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use pkgagent_core::{CollectionConfig, CollectionScheduler};
use pkgagent_pkg::{PackageError, PackageLister};

use common::{Event, RecordingReporter, ScriptedLister, StaticListerFactory, packages};

fn every(interval: Duration) -> CollectionConfig {
    CollectionConfig {
        interval,
        include_rpm: true,
        ..CollectionConfig::default()
    }
}

fn scheduler(
    reporter: &Arc<RecordingReporter>,
    listers: Vec<Arc<dyn PackageLister>>,
) -> CollectionScheduler {
    CollectionScheduler::new(reporter.clone(), Arc::new(StaticListerFactory(listers)))
        .with_initial_delay(Duration::ZERO)
}

async fn wait_for_batches(reporter: &RecordingReporter, count: usize) {
    timeout(Duration::from_secs(5), async {
        while reporter.count(&Event::Close) < count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timeout waiting for {count} batches"));
}

#[tokio::test]
async fn test_cycles_stop_after_cancel() {
    let reporter = RecordingReporter::new();
    let cancel = CancellationToken::new();
    let handle = scheduler(
        &reporter,
        vec![ScriptedLister::succeeding("rpm", packages(&["bash"]))],
    )
    .spawn(every(Duration::from_millis(1)), cancel.clone());

    wait_for_batches(&reporter, 3).await;

    cancel.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();

    let stopped_at = reporter.events().len();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(reporter.events().len(), stopped_at);
    assert_eq!(reporter.events().last(), Some(&Event::Close));
    assert_eq!(reporter.count(&Event::Start), reporter.count(&Event::Close));
}

#[tokio::test]
async fn test_first_cycle_after_initial_delay_only() {
    let reporter = RecordingReporter::new();
    let cancel = CancellationToken::new();
    let handle = scheduler(
        &reporter,
        vec![ScriptedLister::succeeding("rpm", packages(&["bash"]))],
    )
    .spawn(every(Duration::from_secs(3600)), cancel.clone());

    wait_for_batches(&reporter, 1).await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(reporter.count(&Event::Start), 1);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_cancel_before_initial_delay() {
    let reporter = RecordingReporter::new();
    let cancel = CancellationToken::new();
    let handle = CollectionScheduler::new(
        reporter.clone(),
        Arc::new(StaticListerFactory(Vec::new())),
    )
    .spawn(every(Duration::from_secs(3600)), cancel.clone());

    cancel.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_failures_do_not_stop_loop() {
    let reporter = RecordingReporter::new();
    let cancel = CancellationToken::new();
    let lister = ScriptedLister::failing("rpm", PackageError::CommandFailed { status: 1 });
    let handle = scheduler(&reporter, vec![lister.clone()])
        .spawn(every(Duration::from_millis(1)), cancel.clone());

    wait_for_batches(&reporter, 3).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(lister.list_calls() >= 3);
    assert!(reporter.events().iter().any(|e| matches!(
        e,
        Event::Failure { system, .. } if system == "rpm"
    )));
}

#[tokio::test]
async fn test_configurations_are_isolated() {
    let first = RecordingReporter::new();
    let second = RecordingReporter::new();
    let cancel = CancellationToken::new();

    let mut handles = scheduler(
        &first,
        vec![ScriptedLister::succeeding("debian", packages(&["dpkg"]))],
    )
    .spawn_all(
        vec![every(Duration::from_millis(1)), every(Duration::from_millis(2))],
        &cancel,
    );
    handles.push(
        scheduler(
            &second,
            vec![ScriptedLister::failing(
                "rpm",
                PackageError::CommandFailed { status: 2 },
            )],
        )
        .spawn(every(Duration::from_millis(1)), cancel.clone()),
    );

    wait_for_batches(&first, 4).await;
    wait_for_batches(&second, 2).await;

    cancel.cancel();
    for handle in handles {
        timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    assert!(first.events().iter().all(|e| match e {
        Event::Success { system, .. } => system == "debian",
        Event::Failure { .. } => false,
        Event::Start | Event::Close => true,
    }));
    assert!(second.events().iter().all(|e| match e {
        Event::Failure { system, .. } => system == "rpm",
        Event::Success { .. } => false,
        Event::Start | Event::Close => true,
    }));
    assert_eq!(first.count(&Event::Start), first.count(&Event::Close));
    assert_eq!(second.count(&Event::Start), second.count(&Event::Close));
}

#[tokio::test]
#[traced_test]
async fn test_no_systems_still_runs_empty_batches() {
    let reporter = RecordingReporter::new();
    let cancel = CancellationToken::new();
    let config = CollectionConfig {
        interval: Duration::from_millis(1),
        ..CollectionConfig::default()
    };
    let handle = scheduler(&reporter, Vec::new()).spawn(config, cancel.clone());

    wait_for_batches(&reporter, 2).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(
        reporter
            .events()
            .iter()
            .all(|e| matches!(e, Event::Start | Event::Close))
    );
    assert!(logs_contain("configuration enables no package systems"));
}
