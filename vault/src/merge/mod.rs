//! Structured description of a set-based merge.
//!
//! Handlers build a [`MergePlan`] and hand it to an [`crate::engine::Engine`], which either
//! evaluates it directly or renders it into the engine's own `MERGE` statement. The source of a
//! plan is always the change stream and the target is always the persisted vault table.

mod plan;

pub use plan::{
    ActionValue, Assignment, MatchedAction, MergeOutcome, MergePlan, MergeSource,
    NotMatchedAction, SourceColumn, SourceExpr,
};
