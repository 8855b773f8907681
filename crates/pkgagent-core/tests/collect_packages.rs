mod common;

use std::sync::Arc;

use pkgagent_core::{CollectionConfig, CoreError, collect_once, collect_packages};
use pkgagent_pkg::{PackageError, PackageLister};

use common::{Event, RecordingReporter, ScriptedLister, StaticListerFactory, packages};

#[tokio::test]
async fn test_unsupported_success_failure_in_order() {
    let reporter = RecordingReporter::new();
    let a = ScriptedLister::unsupported("a");
    let b = ScriptedLister::succeeding("b", packages(&["vim", "curl"]));
    let c = ScriptedLister::failing("c", PackageError::CommandFailed { status: 1 });
    let listers: Vec<Arc<dyn PackageLister>> = vec![a.clone(), b.clone(), c.clone()];

    let err = collect_packages(&listers, reporter.batch(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Collect { ref system, .. } if system == "c"));
    assert_eq!(
        err.to_string(),
        "failed to collect c packages: failed to run package manager: exit status 1"
    );
    assert_eq!(
        reporter.events(),
        vec![
            Event::Start,
            Event::Failure {
                system: "a".to_string(),
                message: "package system a is not supported".to_string(),
            },
            Event::Success {
                system: "b".to_string(),
                packages: 2,
            },
            Event::Failure {
                system: "c".to_string(),
                message: "failed to run package manager: exit status 1".to_string(),
            },
            Event::Close,
        ]
    );
    assert_eq!(a.list_calls(), 0);
}

#[tokio::test]
async fn test_unsupported_skipped_silently() {
    let reporter = RecordingReporter::new();
    let listers: Vec<Arc<dyn PackageLister>> = vec![
        ScriptedLister::unsupported("a"),
        ScriptedLister::succeeding("b", packages(&["bash"])),
        ScriptedLister::failing("c", PackageError::CommandFailed { status: 1 }),
    ];

    let result = collect_packages(&listers, reporter.batch(), false).await;

    assert!(result.is_err());
    assert_eq!(
        reporter.events(),
        vec![
            Event::Start,
            Event::Success {
                system: "b".to_string(),
                packages: 1,
            },
            Event::Failure {
                system: "c".to_string(),
                message: "failed to run package manager: exit status 1".to_string(),
            },
            Event::Close,
        ]
    );
}

#[tokio::test]
async fn test_failure_aborts_remaining_listers() {
    let reporter = RecordingReporter::new();
    let broken = ScriptedLister::failing(
        "debian",
        PackageError::MalformedOutput {
            line: "tzdata 2019a-1.el8".to_string(),
        },
    );
    let after = ScriptedLister::succeeding("rpm", packages(&["bash"]));
    let listers: Vec<Arc<dyn PackageLister>> = vec![broken.clone(), after.clone()];

    let result = collect_packages(&listers, reporter.batch(), false).await;

    assert!(result.is_err());
    assert_eq!(broken.list_calls(), 1);
    assert_eq!(after.list_calls(), 0);
    assert_eq!(reporter.count(&Event::Close), 1);
}

#[tokio::test]
async fn test_all_succeed() {
    let reporter = RecordingReporter::new();
    let listers: Vec<Arc<dyn PackageLister>> = vec![
        ScriptedLister::succeeding("debian", packages(&["dpkg", "apt"])),
        ScriptedLister::succeeding("rpm", packages(&["tzdata"])),
    ];

    collect_packages(&listers, reporter.batch(), true)
        .await
        .unwrap();

    assert_eq!(
        reporter.events(),
        vec![
            Event::Start,
            Event::Success {
                system: "debian".to_string(),
                packages: 2,
            },
            Event::Success {
                system: "rpm".to_string(),
                packages: 1,
            },
            Event::Close,
        ]
    );
}

#[tokio::test]
async fn test_empty_listers_still_closes() {
    let reporter = RecordingReporter::new();

    collect_packages(&[], reporter.batch(), true).await.unwrap();

    assert_eq!(reporter.events(), vec![Event::Start, Event::Close]);
}

#[tokio::test]
async fn test_close_error_does_not_fail_collection() {
    let reporter = RecordingReporter::failing_close();
    let listers: Vec<Arc<dyn PackageLister>> =
        vec![ScriptedLister::succeeding("rpm", packages(&["bash"]))];

    collect_packages(&listers, reporter.batch(), false)
        .await
        .unwrap();

    assert_eq!(reporter.count(&Event::Close), 1);
}

#[tokio::test]
async fn test_collect_once_returns_fatal_error() {
    let reporter = RecordingReporter::new();
    let factory = StaticListerFactory(vec![
        ScriptedLister::unsupported("debian"),
        ScriptedLister::failing("rpm", PackageError::CommandFailed { status: 1 }),
    ]);

    let err = collect_once(&CollectionConfig::default(), &factory, reporter.as_ref())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to collect rpm packages: failed to run package manager: exit status 1"
    );
    assert_eq!(
        reporter.events(),
        vec![
            Event::Start,
            Event::Failure {
                system: "rpm".to_string(),
                message: "failed to run package manager: exit status 1".to_string(),
            },
            Event::Close,
        ]
    );
}

#[tokio::test]
async fn test_collect_once_success() {
    let reporter = RecordingReporter::new();
    let factory = StaticListerFactory(vec![ScriptedLister::succeeding(
        "debian",
        packages(&["dpkg"]),
    )]);

    collect_once(&CollectionConfig::default(), &factory, reporter.as_ref())
        .await
        .unwrap();

    assert_eq!(reporter.count(&Event::Close), 1);
}
