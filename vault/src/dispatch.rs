use config::shared::LoadMetadataConfig;
use tracing::debug;

use crate::engine::Engine;
use crate::error::VaultResult;
use crate::handlers::hub::merge_hub;
use crate::handlers::link::load_link;
use crate::handlers::reference::merge_reference;
use crate::handlers::satellite::load_satellite;
use crate::merge::MergeOutcome;
use crate::registry::{Entity, TableDefinition};

/// What loading a single table did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A merge was applied to the table.
    Merged(MergeOutcome),
    /// The table kind has no loader yet and was left untouched.
    Skipped,
}

/// Loads `table` from its source stream with the handler of its kind.
///
/// The kind is resolved once when the registry is built, so every table reaching this point
/// has exactly one handler.
pub async fn dispatch<E: Engine>(
    engine: &E,
    table: &TableDefinition,
    metadata: &LoadMetadataConfig,
) -> VaultResult<DispatchOutcome> {
    debug!(
        table = %table.target,
        stream = %table.source_stream,
        kind = %table.kind(),
        "dispatching table"
    );

    let outcome = match &table.entity {
        Entity::Hub {
            business_key,
            hash_key,
        } => DispatchOutcome::Merged(
            merge_hub(
                engine,
                &table.target,
                &table.source_stream,
                business_key,
                hash_key,
                metadata,
            )
            .await?,
        ),
        Entity::Reference { business_key } => DispatchOutcome::Merged(
            merge_reference(
                engine,
                &table.target,
                &table.source_stream,
                business_key,
                metadata,
            )
            .await?,
        ),
        Entity::Link { parent_hubs, .. } => {
            load_link(&table.target, &table.source_stream, parent_hubs);
            DispatchOutcome::Skipped
        }
        Entity::Satellite { attributes, .. } => {
            load_satellite(&table.target, &table.source_stream, attributes);
            DispatchOutcome::Skipped
        }
    };

    Ok(outcome)
}
