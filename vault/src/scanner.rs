use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::VaultResult;
use crate::types::ObjectName;

/// Checks whether `stream` holds pending change rows.
///
/// An empty stream is logged as a no-op so that every skipped stream shows up in the run log.
/// The check and the following merges are separate statements; runs are serialized, so no
/// other reader drains the stream in between.
pub async fn has_pending_changes<E: Engine>(engine: &E, stream: &ObjectName) -> VaultResult<bool> {
    let pending = engine.has_pending_changes(stream).await?;

    if pending {
        debug!(%stream, "stream has pending changes");
    } else {
        info!(%stream, "no changes to process, skipping stream");
    }

    Ok(pending)
}
