use config::shared::LoadMetadataConfig;
use telemetry::init_test_tracing;
use vault::engine::memory::MemoryEngine;
use vault::pipeline::VaultLoader;
use vault::registry::TableRegistry;
use vault::test_utils::table::{inserted_keys, reference_config};
use vault::types::{Cell, TableRow};

#[tokio::test]
async fn reference_rows_missing_from_the_stream_are_left_untouched() {
    init_test_tracing();

    let engine = MemoryEngine::new();
    engine.create_table("REF_NATION").await.unwrap();
    let untouched = TableRow::new()
        .with("NATIONCODE", "IT")
        .with("LDTS", Cell::Null)
        .with("RSCR", "LEGACY");
    engine
        .insert_rows(
            "REF_NATION",
            vec![
                TableRow::new()
                    .with("NATIONCODE", "DE")
                    .with("LDTS", Cell::Null)
                    .with("RSCR", "LEGACY"),
                untouched.clone(),
            ],
        )
        .await
        .unwrap();
    engine
        .push_changes("STG_NATION_STREAM", inserted_keys("NATIONCODE", &["DE", "FR"]))
        .await
        .unwrap();

    let registry = TableRegistry::from_configs(&[reference_config(
        "REF_NATION",
        "STG_NATION_STREAM",
        &["NATIONCODE"],
    )])
    .unwrap();
    let summary = VaultLoader::new(engine.clone(), registry, LoadMetadataConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.tables_merged, 1);
    assert_eq!(summary.rows_affected, 2);

    let rows = engine.table_rows("REF_NATION").await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.contains(&untouched));

    let updated = rows
        .iter()
        .find(|row| row.get("NATIONCODE") == &Cell::from("DE"))
        .unwrap();
    assert_eq!(updated.get("RSCR"), &Cell::from("SYSTEM"));
    assert!(matches!(updated.get("LDTS"), Cell::TimestampTz(_)));
}
