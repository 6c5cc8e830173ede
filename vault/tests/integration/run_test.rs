use config::shared::LoadMetadataConfig;
use telemetry::init_test_tracing;
use vault::engine::memory::MemoryEngine;
use vault::error::ErrorKind;
use vault::pipeline::{RunSummary, VaultLoader};
use vault::registry::TableRegistry;
use vault::test_utils::table::{hub_config, inserted_keys, link_config, satellite_config};
use vault::test_utils::test_engine_wrapper::TestEngineWrapper;
use vault::types::ObjectName;

#[tokio::test]
async fn empty_streams_issue_no_merge() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    engine.wrapped().create_table("HUB_CUSTOMER").await.unwrap();
    engine.wrapped().create_table("HUB_ORDER").await.unwrap();
    engine
        .wrapped()
        .create_stream("STG_CUSTOMER_STRM_OUTBOUND")
        .await
        .unwrap();
    engine
        .wrapped()
        .push_changes(
            "STG_ORDER_STRM_OUTBOUND",
            inserted_keys("O_ORDERKEY", &["1"]),
        )
        .await
        .unwrap();

    let registry = TableRegistry::from_configs(&[
        hub_config("HUB_CUSTOMER", "STG_CUSTOMER_STRM_OUTBOUND", "C_CUSTKEY"),
        hub_config("HUB_ORDER", "STG_ORDER_STRM_OUTBOUND", "O_ORDERKEY"),
    ])
    .unwrap();
    let summary = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(
        summary,
        RunSummary {
            streams_scanned: 2,
            streams_skipped: 1,
            tables_merged: 1,
            tables_skipped: 1,
            rows_affected: 1,
        }
    );

    let merges = engine.wrapped().merges().await;
    assert_eq!(merges.len(), 1);
    assert_eq!(merges[0].target.to_string(), "HUB_ORDER");
    assert!(
        engine
            .wrapped()
            .table_rows("HUB_CUSTOMER")
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(engine.close_calls().await, 1);
}

#[tokio::test]
async fn each_stream_is_scanned_once_in_sorted_order() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    for stream in ["STG_B", "STG_A"] {
        engine.wrapped().create_stream(stream).await.unwrap();
    }

    let registry = TableRegistry::from_configs(&[
        hub_config("HUB_ONE", "STG_B", "KEY"),
        hub_config("HUB_TWO", "STG_A", "KEY"),
        hub_config("HUB_THREE", "STG_B", "KEY"),
    ])
    .unwrap();
    VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(
        engine.scanned_streams().await,
        vec![
            ObjectName::parse("STG_A").unwrap(),
            ObjectName::parse("STG_B").unwrap(),
        ]
    );
}

#[tokio::test]
async fn links_and_satellites_are_skipped_without_merging() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    engine.wrapped().create_table("HUB_CUSTOMER").await.unwrap();
    engine
        .wrapped()
        .push_changes(
            "STG_CUSTOMER_STRM_OUTBOUND",
            inserted_keys("C_CUSTKEY", &["123"]),
        )
        .await
        .unwrap();

    let registry = TableRegistry::from_configs(&[
        hub_config("HUB_CUSTOMER", "STG_CUSTOMER_STRM_OUTBOUND", "C_CUSTKEY"),
        link_config(
            "LNK_CUSTOMER_ORDER",
            "STG_CUSTOMER_STRM_OUTBOUND",
            &["HUB_CUSTOMER", "HUB_ORDER"],
        ),
        satellite_config("SAT_CUSTOMER", "STG_CUSTOMER_STRM_OUTBOUND", &["C_NAME"]),
    ])
    .unwrap();
    let summary = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.tables_merged, 1);
    assert_eq!(summary.tables_skipped, 2);
    assert_eq!(engine.merge_calls().await, 1);
}

#[tokio::test]
async fn empty_registry_fails_without_scanning() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    let registry = TableRegistry::from_configs(&[]).unwrap();

    let err = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
    assert!(engine.scanned_streams().await.is_empty());
    assert_eq!(engine.close_calls().await, 1);
}
