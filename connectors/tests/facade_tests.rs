use std::sync::Arc;

use connectors::{mongo, mysql, FacadeError, FacadeSettings, Recorder, TaskReport};
use pool::PoolOptions;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn mysql_pools_are_shared_per_configuration() {
    init_logging();
    let registry = mysql::registry(&FacadeSettings::default());

    let mut options = PoolOptions::new("db.internal");
    options.database = Some("app".to_string());

    let first = registry.get_or_create(options.clone()).unwrap();
    let second = registry.get_or_create(options).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.pool_count(), 1);

    // Nothing dials out until a connection is actually borrowed.
    assert_eq!(first.open_connections(), 0);
}

#[tokio::test]
async fn mysql_registry_accepts_opaque_urls() {
    init_logging();
    let registry = mysql::registry(&FacadeSettings::default());

    let first = registry
        .get_or_create("mysql://app@db.internal/app")
        .unwrap();
    let second = registry
        .get_or_create("mysql://app@db.internal/app")
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.pool_count(), 1);
}

#[tokio::test]
async fn mysql_registry_rejects_malformed_urls() {
    init_logging();
    let registry = mysql::registry(&FacadeSettings::default());

    assert!(registry.get_or_create("not a url").is_err());
    assert_eq!(registry.pool_count(), 0);
}

#[tokio::test]
async fn mongo_rejects_a_foreign_scheme_before_io() {
    init_logging();

    let err = mongo::connect("notmongo://host").await.unwrap_err();
    assert!(matches!(err, FacadeError::Config(_)));
}

#[test]
fn a_report_packages_output_and_outcome() {
    let recorder = Recorder::new();
    recorder.record("starting");

    let report = TaskReport::from_result(Ok::<_, String>("done"), &recorder);

    assert_eq!(report.stdout, vec!["starting"]);
    assert_eq!(report.result, Some(serde_json::json!("done")));
    assert!(report.error.is_none());
}
