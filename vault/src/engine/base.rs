use std::future::Future;

use crate::error::VaultResult;
use crate::merge::{MergeOutcome, MergePlan};
use crate::types::ObjectName;

/// A session against the query engine that stores streams and vault tables.
///
/// The engine owns the heavy lifting: reading change streams, computing digests and
/// applying the set-based merge. Implementations must apply a [`MergePlan`] as a single
/// statement so that a failed merge leaves the target table unchanged.
pub trait Engine {
    /// Returns the name of the engine.
    fn name() -> &'static str;

    /// Returns whether `stream` currently holds at least one change row.
    ///
    /// The check is not atomic with the following merges. This is acceptable because a run is
    /// the only reader of its streams.
    fn has_pending_changes(
        &self,
        stream: &ObjectName,
    ) -> impl Future<Output = VaultResult<bool>> + Send;

    /// Applies `plan` to its target table.
    fn merge(&self, plan: &MergePlan) -> impl Future<Output = VaultResult<MergeOutcome>> + Send;

    /// Ends the session.
    ///
    /// The default implementation is a no-op. Called exactly once per run, whether the run
    /// succeeded or not.
    fn close(&self) -> impl Future<Output = VaultResult<()>> + Send {
        async { Ok(()) }
    }
}
