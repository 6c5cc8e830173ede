use config::shared::LoadMetadataConfig;
use tracing::info;

use crate::engine::Engine;
use crate::error::VaultResult;
use crate::merge::{
    ActionValue, Assignment, MatchedAction, MergeOutcome, MergePlan, MergeSource,
    NotMatchedAction, SourceColumn, SourceExpr,
};
use crate::types::ObjectName;

/// Builds the upsert of a reference table keyed by its business key.
///
/// Matched rows get a fresh load timestamp and record source, unmatched keys are inserted.
/// Reference rows without a counterpart in the stream are left alone.
pub fn reference_merge_plan(
    target: &ObjectName,
    stream: &ObjectName,
    business_key: &[String],
    metadata: &LoadMetadataConfig,
) -> MergePlan {
    let columns = business_key
        .iter()
        .map(|column| SourceColumn::new(column.as_str(), SourceExpr::Column(column.clone())))
        .collect();

    let audit = || {
        vec![
            Assignment::new(
                metadata.load_timestamp_column.as_str(),
                ActionValue::CurrentTimestamp,
            ),
            Assignment::new(
                metadata.record_source_column.as_str(),
                ActionValue::Literal(metadata.record_source.clone()),
            ),
        ]
    };

    let mut inserts: Vec<Assignment> = business_key
        .iter()
        .map(|column| Assignment::from_source(column.as_str()))
        .collect();
    inserts.extend(audit());

    MergePlan {
        target: target.clone(),
        source: MergeSource {
            stream: stream.clone(),
            columns,
            non_null: business_key.to_vec(),
        },
        on: business_key.to_vec(),
        when_matched: Some(MatchedAction::Update(audit())),
        when_not_matched: Some(NotMatchedAction::Insert(inserts)),
    }
}

/// Upserts the business keys of `stream` into the reference table `target`.
pub async fn merge_reference<E: Engine>(
    engine: &E,
    target: &ObjectName,
    stream: &ObjectName,
    business_key: &[String],
    metadata: &LoadMetadataConfig,
) -> VaultResult<MergeOutcome> {
    let plan = reference_merge_plan(target, stream, business_key, metadata);
    let outcome = engine.merge(&plan).await?;

    info!(
        table = %target,
        %stream,
        rows_affected = outcome.rows_affected,
        "merged reference table"
    );

    Ok(outcome)
}
