use config::shared::{HashAlgorithm, LoadMetadataConfig};
use telemetry::init_test_tracing;
use vault::engine::Engine;
use vault::error::ErrorKind;
use vault::hash::hash_text;
use vault::pipeline::{RunSummary, VaultLoader};
use vault::registry::TableRegistry;
use vault::test_utils::database::{
    TestWarehouse, setup_test_warehouse, skip_if_missing_database_env_vars,
};
use vault::test_utils::table::{hub_config, reference_config};
use vault::types::ObjectName;

const HUB: &str = "HUB_CUSTOMER";
const HUB_STREAM: &str = "STG_CUSTOMER_STRM_OUTBOUND";
const HASH_KEY: &str = "SHA1_HUB_CUSTOMER";

async fn create_customer_hub(warehouse: &TestWarehouse, keys: &[Option<&str>]) {
    warehouse
        .create_table(
            HUB_STREAM,
            &[("C_CUSTKEY", "text"), ("METADATA$ACTION", "text")],
        )
        .await;
    let rows: Vec<[Option<&str>; 2]> = keys.iter().map(|key| [*key, Some("INSERT")]).collect();
    let rows: Vec<&[Option<&str>]> = rows.iter().map(|row| row.as_slice()).collect();
    warehouse
        .insert_rows(HUB_STREAM, &["C_CUSTKEY", "METADATA$ACTION"], &rows)
        .await;

    warehouse
        .create_table(
            HUB,
            &[
                (HASH_KEY, "text primary key"),
                ("C_CUSTKEY", "text not null"),
                ("LDTS", "timestamptz not null"),
                ("RSCR", "text not null"),
            ],
        )
        .await;
}

async fn load_hub(warehouse: &TestWarehouse, metadata: LoadMetadataConfig) -> RunSummary {
    let registry = TableRegistry::from_configs(&[hub_config(HUB, HUB_STREAM, "C_CUSTKEY")]).unwrap();

    VaultLoader::new(warehouse.engine().await, registry, metadata)
        .run()
        .await
        .unwrap()
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[tokio::test]
async fn sha1_hub_merge_hashes_in_the_warehouse_and_reruns_are_idempotent() {
    if skip_if_missing_database_env_vars() {
        return;
    }
    init_test_tracing();

    let warehouse = setup_test_warehouse().await;
    create_customer_hub(&warehouse, &[Some("123"), Some("124"), Some("123"), None]).await;

    let summary = load_hub(&warehouse, LoadMetadataConfig::default()).await;

    assert_eq!(
        summary,
        RunSummary {
            streams_scanned: 1,
            streams_skipped: 0,
            tables_merged: 1,
            tables_skipped: 0,
            rows_affected: 2,
        }
    );
    let rows = warehouse
        .text_rows(HUB, &["C_CUSTKEY", HASH_KEY, "RSCR"])
        .await;
    assert_eq!(
        rows,
        vec![
            vec![
                text("123"),
                text("40bd001563085fc35165329ea1ff5c5ecbdbbeef"),
                text("SYSTEM"),
            ],
            vec![
                text("124"),
                text(&hash_text(HashAlgorithm::Sha1, "124")),
                text("SYSTEM"),
            ],
        ]
    );

    // The stream is never consumed, a second session must not add rows.
    let summary = load_hub(&warehouse, LoadMetadataConfig::default()).await;

    assert_eq!(summary.rows_affected, 0);
    assert_eq!(
        warehouse
            .text_rows(HUB, &["C_CUSTKEY", HASH_KEY, "RSCR"])
            .await,
        rows
    );

    warehouse.drop_schema().await;
}

#[tokio::test]
async fn sha256_hub_merge_matches_in_process_hashing() {
    if skip_if_missing_database_env_vars() {
        return;
    }
    init_test_tracing();

    let warehouse = setup_test_warehouse().await;
    create_customer_hub(&warehouse, &[Some("123")]).await;

    let metadata = LoadMetadataConfig {
        hash_algorithm: HashAlgorithm::Sha256,
        record_source: "CRM".to_string(),
        ..LoadMetadataConfig::default()
    };
    let summary = load_hub(&warehouse, metadata).await;

    assert_eq!(summary.rows_affected, 1);
    assert_eq!(
        warehouse.text_rows(HUB, &[HASH_KEY, "RSCR"]).await,
        vec![vec![
            text(&hash_text(HashAlgorithm::Sha256, "123")),
            text("CRM"),
        ]]
    );

    warehouse.drop_schema().await;
}

#[tokio::test]
async fn reference_upsert_refreshes_matched_rows_and_leaves_others() {
    if skip_if_missing_database_env_vars() {
        return;
    }
    init_test_tracing();

    let warehouse = setup_test_warehouse().await;
    warehouse
        .create_table(
            "STG_NATION_STREAM",
            &[("NATIONCODE", "text"), ("METADATA$ACTION", "text")],
        )
        .await;
    warehouse
        .insert_rows(
            "STG_NATION_STREAM",
            &["NATIONCODE", "METADATA$ACTION"],
            &[&[Some("DE"), Some("UPDATE")], &[Some("FR"), Some("INSERT")]],
        )
        .await;
    warehouse
        .create_table(
            "REF_NATION",
            &[
                ("NATIONCODE", "text primary key"),
                ("LDTS", "timestamptz"),
                ("RSCR", "text"),
            ],
        )
        .await;
    warehouse
        .insert_rows(
            "REF_NATION",
            &["NATIONCODE", "RSCR"],
            &[&[Some("DE"), Some("LEGACY")], &[Some("IT"), Some("LEGACY")]],
        )
        .await;

    let registry = TableRegistry::from_configs(&[reference_config(
        "REF_NATION",
        "STG_NATION_STREAM",
        &["NATIONCODE"],
    )])
    .unwrap();
    let summary = VaultLoader::new(warehouse.engine().await, registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.rows_affected, 2);
    let rows = warehouse
        .text_rows("REF_NATION", &["NATIONCODE", "RSCR", "LDTS"])
        .await;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][..2], [text("DE"), text("SYSTEM")]);
    assert!(rows[0][2].is_some());
    assert_eq!(rows[1][..2], [text("FR"), text("SYSTEM")]);
    assert!(rows[1][2].is_some());
    assert_eq!(rows[2], vec![text("IT"), text("LEGACY"), None]);

    warehouse.drop_schema().await;
}

#[tokio::test]
async fn empty_stream_is_skipped_without_merging() {
    if skip_if_missing_database_env_vars() {
        return;
    }
    init_test_tracing();

    let warehouse = setup_test_warehouse().await;
    create_customer_hub(&warehouse, &[]).await;

    let summary = load_hub(&warehouse, LoadMetadataConfig::default()).await;

    assert_eq!(
        summary,
        RunSummary {
            streams_scanned: 1,
            streams_skipped: 1,
            tables_merged: 0,
            tables_skipped: 1,
            rows_affected: 0,
        }
    );
    assert!(warehouse.text_rows(HUB, &[HASH_KEY]).await.is_empty());

    warehouse.drop_schema().await;
}

#[tokio::test]
async fn missing_stream_is_reported_as_such() {
    if skip_if_missing_database_env_vars() {
        return;
    }
    init_test_tracing();

    let warehouse = setup_test_warehouse().await;
    let engine = warehouse.engine().await;

    let err = engine
        .has_pending_changes(&ObjectName::parse("STG_MISSING").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StreamMissing);
    engine.close().await.unwrap();
    warehouse.drop_schema().await;
}
