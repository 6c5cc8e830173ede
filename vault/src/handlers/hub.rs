use config::shared::LoadMetadataConfig;
use tracing::info;

use crate::engine::Engine;
use crate::error::VaultResult;
use crate::merge::{
    Assignment, MergeOutcome, MergePlan, MergeSource, NotMatchedAction, SourceColumn, SourceExpr,
};
use crate::types::ObjectName;

/// Builds the insert-only merge of a hub.
///
/// Every distinct non-null business key of the stream is hashed, and keys whose hash is not in
/// the hub yet are inserted with the load timestamp and record source. Existing hub rows are
/// never updated, which makes reruns over the same changes a no-op.
pub fn hub_merge_plan(
    target: &ObjectName,
    stream: &ObjectName,
    business_key: &[String],
    hash_key: &str,
    metadata: &LoadMetadataConfig,
) -> MergePlan {
    let mut columns = Vec::with_capacity(business_key.len() + 3);
    columns.push(SourceColumn::new(
        hash_key,
        SourceExpr::Digest {
            algorithm: metadata.hash_algorithm,
            columns: business_key.to_vec(),
        },
    ));
    for column in business_key {
        columns.push(SourceColumn::new(
            column.as_str(),
            SourceExpr::Column(column.clone()),
        ));
    }
    columns.push(SourceColumn::new(
        metadata.load_timestamp_column.as_str(),
        SourceExpr::CurrentTimestamp,
    ));
    columns.push(SourceColumn::new(
        metadata.record_source_column.as_str(),
        SourceExpr::Literal(metadata.record_source.clone()),
    ));

    let inserts = columns
        .iter()
        .map(|column| Assignment::from_source(column.name.as_str()))
        .collect();

    MergePlan {
        target: target.clone(),
        source: MergeSource {
            stream: stream.clone(),
            columns,
            non_null: business_key.to_vec(),
        },
        on: vec![hash_key.to_string()],
        when_matched: None,
        when_not_matched: Some(NotMatchedAction::Insert(inserts)),
    }
}

/// Inserts the newly seen business keys of `stream` into the hub `target`.
pub async fn merge_hub<E: Engine>(
    engine: &E,
    target: &ObjectName,
    stream: &ObjectName,
    business_key: &[String],
    hash_key: &str,
    metadata: &LoadMetadataConfig,
) -> VaultResult<MergeOutcome> {
    let plan = hub_merge_plan(target, stream, business_key, hash_key, metadata);
    let outcome = engine.merge(&plan).await?;

    info!(
        table = %target,
        %stream,
        rows_affected = outcome.rows_affected,
        "merged hub"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use config::shared::HashAlgorithm;

    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::hash::hash_text;
    use crate::types::{Cell, ChangeRow, TableRow};

    const HUB: &str = "HUB_CUSTOMER";
    const STREAM: &str = "STG_CUSTOMER_STRM_OUTBOUND";

    fn names() -> (ObjectName, ObjectName) {
        (
            ObjectName::parse(HUB).unwrap(),
            ObjectName::parse(STREAM).unwrap(),
        )
    }

    async fn merge(engine: &MemoryEngine) -> MergeOutcome {
        let (target, stream) = names();
        merge_hub(
            engine,
            &target,
            &stream,
            &["C_CUSTKEY".to_string()],
            "SHA1_HUB_CUSTOMER",
            &LoadMetadataConfig::default(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn plan_never_updates_existing_rows() {
        let (target, stream) = names();
        let plan = hub_merge_plan(
            &target,
            &stream,
            &["C_CUSTKEY".to_string()],
            "SHA1_HUB_CUSTOMER",
            &LoadMetadataConfig::default(),
        );

        assert_eq!(plan.on, vec!["SHA1_HUB_CUSTOMER".to_string()]);
        assert!(plan.when_matched.is_none());
        assert_eq!(plan.source.non_null, vec!["C_CUSTKEY".to_string()]);
        assert_eq!(
            plan.source.column("RSCR").map(|column| &column.expr),
            Some(&SourceExpr::Literal("SYSTEM".to_string()))
        );
        assert_eq!(
            plan.source.column("SHA1_HUB_CUSTOMER").map(|column| &column.expr),
            Some(&SourceExpr::Digest {
                algorithm: HashAlgorithm::Sha1,
                columns: vec!["C_CUSTKEY".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn inserts_new_keys_once() {
        let engine = MemoryEngine::new();
        engine.create_table(HUB).await.unwrap();
        engine
            .push_changes(
                STREAM,
                vec![
                    ChangeRow::insert(TableRow::new().with("C_CUSTKEY", "123")),
                    ChangeRow::update(TableRow::new().with("C_CUSTKEY", "123")),
                    ChangeRow::insert(TableRow::new().with("C_CUSTKEY", Cell::Null)),
                ],
            )
            .await
            .unwrap();

        assert_eq!(merge(&engine).await.rows_affected, 1);
        assert_eq!(merge(&engine).await.rows_affected, 0);

        let rows = engine.table_rows(HUB).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("SHA1_HUB_CUSTOMER"),
            &Cell::from(hash_text(HashAlgorithm::Sha1, "123"))
        );
        assert_eq!(rows[0].get("C_CUSTKEY"), &Cell::from("123"));
        assert_eq!(rows[0].get("RSCR"), &Cell::from("SYSTEM"));
        assert!(matches!(rows[0].get("LDTS"), Cell::TimestampTz(_)));
    }

    #[tokio::test]
    async fn existing_rows_keep_their_load_timestamp() {
        let engine = MemoryEngine::new();
        engine.create_table(HUB).await.unwrap();
        engine
            .push_changes(
                STREAM,
                vec![ChangeRow::insert(TableRow::new().with("C_CUSTKEY", "123"))],
            )
            .await
            .unwrap();

        merge(&engine).await;
        let first = engine.table_rows(HUB).await.unwrap();
        merge(&engine).await;
        let second = engine.table_rows(HUB).await.unwrap();

        assert_eq!(first, second);
    }
}
