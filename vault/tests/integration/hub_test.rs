use chrono::Utc;
use config::shared::{HashAlgorithm, LoadMetadataConfig};
use telemetry::init_test_tracing;
use vault::engine::memory::MemoryEngine;
use vault::hash::hash_text;
use vault::pipeline::{RunSummary, VaultLoader};
use vault::registry::TableRegistry;
use vault::test_utils::table::{hub_config, inserted_keys};
use vault::types::Cell;

const HUB: &str = "HUB_CUSTOMER";
const STREAM: &str = "STG_CUSTOMER_STRM_OUTBOUND";

/// Runs the loader on its own session over `engine`'s storage, like one process invocation.
async fn run_once(engine: &MemoryEngine, metadata: LoadMetadataConfig) -> RunSummary {
    let registry = TableRegistry::from_configs(&[hub_config(HUB, STREAM, "C_CUSTKEY")]).unwrap();
    let session = engine.new_session();

    let summary = VaultLoader::new(session.clone(), registry, metadata)
        .run()
        .await
        .unwrap();
    assert!(session.is_closed());

    summary
}

#[tokio::test]
async fn hub_is_loaded_once_and_reruns_are_idempotent() {
    init_test_tracing();

    let engine = MemoryEngine::new();
    engine.create_table(HUB).await.unwrap();
    engine
        .push_changes(STREAM, inserted_keys("C_CUSTKEY", &["123"]))
        .await
        .unwrap();

    let before = Utc::now();
    let summary = run_once(&engine, LoadMetadataConfig::default()).await;

    assert_eq!(
        summary,
        RunSummary {
            streams_scanned: 1,
            streams_skipped: 0,
            tables_merged: 1,
            tables_skipped: 0,
            rows_affected: 1,
        }
    );

    let rows = engine.table_rows(HUB).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("SHA1_HUB_CUSTOMER"),
        &Cell::from("40bd001563085fc35165329ea1ff5c5ecbdbbeef")
    );
    assert_eq!(rows[0].get("C_CUSTKEY"), &Cell::from("123"));
    assert_eq!(rows[0].get("RSCR"), &Cell::from("SYSTEM"));
    match rows[0].get("LDTS") {
        Cell::TimestampTz(loaded_at) => {
            assert!(*loaded_at >= before);
            assert!(*loaded_at <= Utc::now());
        }
        other => panic!("unexpected load timestamp {other:?}"),
    }

    // The stream still holds the same change, a second run must not duplicate the hub row.
    let summary = run_once(&engine, LoadMetadataConfig::default()).await;

    assert_eq!(summary.streams_scanned, 1);
    assert_eq!(summary.tables_merged, 1);
    assert_eq!(summary.rows_affected, 0);
    assert_eq!(engine.table_rows(HUB).await.unwrap(), rows);
    assert_eq!(engine.merges().await.len(), 2);
}

#[tokio::test]
async fn distinct_business_keys_get_distinct_hash_keys() {
    init_test_tracing();

    let engine = MemoryEngine::new();
    engine.create_table(HUB).await.unwrap();
    engine
        .push_changes(STREAM, inserted_keys("C_CUSTKEY", &["123", "124", "123"]))
        .await
        .unwrap();

    let summary = run_once(&engine, LoadMetadataConfig::default()).await;

    assert_eq!(summary.rows_affected, 2);
    let rows = engine.table_rows(HUB).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(
        rows[0].get("SHA1_HUB_CUSTOMER"),
        rows[1].get("SHA1_HUB_CUSTOMER")
    );
}

#[tokio::test]
async fn configured_metadata_columns_and_algorithm_are_used() {
    init_test_tracing();

    let engine = MemoryEngine::new();
    engine.create_table(HUB).await.unwrap();
    engine
        .push_changes(STREAM, inserted_keys("C_CUSTKEY", &["123"]))
        .await
        .unwrap();

    let metadata = LoadMetadataConfig {
        load_timestamp_column: "LOAD_DATE".to_string(),
        record_source_column: "RECORD_SOURCE".to_string(),
        record_source: "CRM".to_string(),
        hash_algorithm: HashAlgorithm::Sha256,
        ..LoadMetadataConfig::default()
    };
    run_once(&engine, metadata).await;

    let rows = engine.table_rows(HUB).await.unwrap();
    assert_eq!(
        rows[0].get("SHA1_HUB_CUSTOMER"),
        &Cell::from(hash_text(HashAlgorithm::Sha256, "123"))
    );
    assert_eq!(rows[0].get("RECORD_SOURCE"), &Cell::from("CRM"));
    assert!(matches!(rows[0].get("LOAD_DATE"), Cell::TimestampTz(_)));
    assert!(!rows[0].contains("LDTS"));
}
