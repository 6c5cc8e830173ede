use config::shared::LoadMetadataConfig;
use telemetry::init_test_tracing;
use vault::engine::memory::MemoryEngine;
use vault::error::ErrorKind;
use vault::pipeline::VaultLoader;
use vault::registry::TableRegistry;
use vault::test_utils::table::{hub_config, inserted_keys};
use vault::test_utils::test_engine_wrapper::TestEngineWrapper;

#[tokio::test]
async fn missing_target_table_fails_the_run_and_closes_the_session() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    engine
        .wrapped()
        .push_changes(
            "STG_CUSTOMER_STRM_OUTBOUND",
            inserted_keys("C_CUSTKEY", &["123"]),
        )
        .await
        .unwrap();

    let registry = TableRegistry::from_configs(&[hub_config(
        "HUB_CUSTOMER",
        "STG_CUSTOMER_STRM_OUTBOUND",
        "C_CUSTKEY",
    )])
    .unwrap();
    let err = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TargetTableMissing);
    assert_eq!(engine.close_calls().await, 1);
    assert!(engine.wrapped().is_closed());
}

#[tokio::test]
async fn failed_merge_aborts_the_remaining_streams() {
    init_test_tracing();

    let engine = TestEngineWrapper::wrap(MemoryEngine::new());
    for (table, stream, column) in [
        ("HUB_CUSTOMER", "STG_A_CUSTOMER", "C_CUSTKEY"),
        ("HUB_ORDER", "STG_B_ORDER", "O_ORDERKEY"),
    ] {
        engine.wrapped().create_table(table).await.unwrap();
        engine
            .wrapped()
            .push_changes(stream, inserted_keys(column, &["1"]))
            .await
            .unwrap();
    }
    engine.fail_merges_into("HUB_CUSTOMER").await.unwrap();

    let registry = TableRegistry::from_configs(&[
        hub_config("HUB_CUSTOMER", "STG_A_CUSTOMER", "C_CUSTKEY"),
        hub_config("HUB_ORDER", "STG_B_ORDER", "O_ORDERKEY"),
    ])
    .unwrap();
    let err = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EngineQueryFailed);
    assert_eq!(engine.scanned_streams().await.len(), 1);
    assert!(
        engine
            .wrapped()
            .table_rows("HUB_ORDER")
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(engine.close_calls().await, 1);
}

#[tokio::test]
async fn missing_stream_fails_the_run() {
    init_test_tracing();

    let engine = MemoryEngine::new();
    let registry =
        TableRegistry::from_configs(&[hub_config("HUB_CUSTOMER", "STG_MISSING", "C_CUSTKEY")])
            .unwrap();

    let err = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StreamMissing);
    assert!(engine.is_closed());
}
