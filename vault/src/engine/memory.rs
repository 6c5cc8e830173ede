use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bail;
use crate::engine::Engine;
use crate::error::{ErrorKind, VaultResult};
use crate::hash::hash_business_key;
use crate::merge::{
    ActionValue, Assignment, MatchedAction, MergeOutcome, MergePlan, NotMatchedAction, SourceExpr,
};
use crate::types::{Cell, ChangeRow, ObjectName, TableRow};

#[derive(Debug, Default)]
struct Storage {
    streams: HashMap<ObjectName, Vec<ChangeRow>>,
    tables: HashMap<ObjectName, Vec<TableRow>>,
    merges: Vec<MergePlan>,
}

/// In-process engine holding streams and tables in memory.
///
/// [`MemoryEngine`] evaluates merge plans with the same semantics a warehouse `MERGE`
/// statement has: the source is projected and de-duplicated, matching happens against the
/// target as it was before the statement, and a target row matched by several source rows is
/// an error. All data is lost when the process exits.
///
/// Clones are the same session: they share storage and are closed together, which lets tests
/// keep a handle while a pipeline owns another. [`MemoryEngine::new_session`] opens another
/// session over the same storage, the way a second run connects to the same warehouse.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    storage: Arc<Mutex<Storage>>,
    closed: Arc<AtomicBool>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session over the streams and tables of this engine.
    ///
    /// The new session starts open, whether or not this one was closed.
    pub fn new_session(&self) -> MemoryEngine {
        MemoryEngine {
            storage: self.storage.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates an empty change stream, replacing any existing one.
    pub async fn create_stream(&self, stream: &str) -> VaultResult<()> {
        let stream = ObjectName::parse(stream)?;
        let mut storage = self.storage.lock().await;
        storage.streams.insert(stream, Vec::new());

        Ok(())
    }

    /// Appends change rows to a stream, creating it if needed.
    pub async fn push_changes(&self, stream: &str, changes: Vec<ChangeRow>) -> VaultResult<()> {
        let stream = ObjectName::parse(stream)?;
        let mut storage = self.storage.lock().await;
        storage.streams.entry(stream).or_default().extend(changes);

        Ok(())
    }

    /// Removes all pending rows from a stream, as consuming it in the warehouse would.
    pub async fn consume_stream(&self, stream: &str) -> VaultResult<()> {
        let stream = ObjectName::parse(stream)?;
        let mut storage = self.storage.lock().await;
        match storage.streams.get_mut(&stream) {
            Some(changes) => changes.clear(),
            None => bail!(ErrorKind::StreamMissing, "Change stream not found", stream),
        }

        Ok(())
    }

    /// Creates an empty target table, replacing any existing one.
    pub async fn create_table(&self, table: &str) -> VaultResult<()> {
        let table = ObjectName::parse(table)?;
        let mut storage = self.storage.lock().await;
        storage.tables.insert(table, Vec::new());

        Ok(())
    }

    /// Inserts rows into an existing target table.
    pub async fn insert_rows(&self, table: &str, rows: Vec<TableRow>) -> VaultResult<()> {
        let table = ObjectName::parse(table)?;
        let mut storage = self.storage.lock().await;
        match storage.tables.get_mut(&table) {
            Some(existing) => existing.extend(rows),
            None => bail!(ErrorKind::TargetTableMissing, "Target table not found", table),
        }

        Ok(())
    }

    /// Returns a copy of the rows of `table`, or [`None`] if it does not exist.
    pub async fn table_rows(&self, table: &str) -> Option<Vec<TableRow>> {
        let table = ObjectName::parse(table).ok()?;
        let storage = self.storage.lock().await;
        storage.tables.get(&table).cloned()
    }

    /// Returns the stored form of a stream's rows, including the change kind column.
    pub async fn stream_rows(
        &self,
        stream: &str,
        change_kind_column: &str,
    ) -> Option<Vec<TableRow>> {
        let stream = ObjectName::parse(stream).ok()?;
        let storage = self.storage.lock().await;
        storage.streams.get(&stream).map(|changes| {
            changes
                .iter()
                .map(|change| change.with_marker(change_kind_column))
                .collect()
        })
    }

    /// Returns every merge plan applied so far, in order.
    pub async fn merges(&self) -> Vec<MergePlan> {
        let storage = self.storage.lock().await;
        storage.merges.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> VaultResult<()> {
        if self.is_closed() {
            bail!(ErrorKind::InvalidState, "Session is closed");
        }

        Ok(())
    }
}

impl Engine for MemoryEngine {
    fn name() -> &'static str {
        "memory"
    }

    async fn has_pending_changes(&self, stream: &ObjectName) -> VaultResult<bool> {
        self.ensure_open()?;
        let storage = self.storage.lock().await;

        match storage.streams.get(stream) {
            Some(changes) => Ok(!changes.is_empty()),
            None => bail!(ErrorKind::StreamMissing, "Change stream not found", stream),
        }
    }

    async fn merge(&self, plan: &MergePlan) -> VaultResult<MergeOutcome> {
        self.ensure_open()?;
        let mut storage = self.storage.lock().await;

        let Some(changes) = storage.streams.get(&plan.source.stream) else {
            bail!(
                ErrorKind::StreamMissing,
                "Change stream not found",
                plan.source.stream
            );
        };

        // One timestamp per statement, like `current_timestamp` in a transaction.
        let now = Utc::now();
        let source_rows = evaluate_source(plan, changes, now)?;

        let Some(target_rows) = storage.tables.get_mut(&plan.target) else {
            bail!(ErrorKind::TargetTableMissing, "Target table not found", plan.target);
        };

        let rows_affected = apply_merge(plan, &source_rows, target_rows, now)?;

        debug!(
            target = %plan.target,
            source_rows = source_rows.len(),
            rows_affected,
            "evaluated merge in memory"
        );

        storage.merges.push(plan.clone());

        Ok(MergeOutcome { rows_affected })
    }

    async fn close(&self) -> VaultResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            bail!(ErrorKind::InvalidState, "Session is already closed");
        }

        info!("closed memory engine session");

        Ok(())
    }
}

/// Projects the change rows into the distinct source rows of the merge.
fn evaluate_source(
    plan: &MergePlan,
    changes: &[ChangeRow],
    now: DateTime<Utc>,
) -> VaultResult<Vec<TableRow>> {
    let mut source_rows: Vec<TableRow> = Vec::with_capacity(changes.len());

    for change in changes {
        let row = change.projected();
        if plan
            .source
            .non_null
            .iter()
            .any(|column| row.get(column).is_null())
        {
            continue;
        }

        let mut source_row = TableRow::new();
        for column in &plan.source.columns {
            let value = match &column.expr {
                SourceExpr::Column(name) => row.get(name).clone(),
                SourceExpr::Digest { algorithm, columns } => {
                    let values: Vec<&Cell> = columns.iter().map(|name| row.get(name)).collect();
                    Cell::String(hash_business_key(*algorithm, &values)?)
                }
                SourceExpr::CurrentTimestamp => Cell::TimestampTz(now),
                SourceExpr::Literal(value) => Cell::String(value.clone()),
            };
            source_row.set(column.name.clone(), value);
        }

        if !source_rows.contains(&source_row) {
            source_rows.push(source_row);
        }
    }

    Ok(source_rows)
}

/// Applies the plan's actions and returns the number of affected target rows.
fn apply_merge(
    plan: &MergePlan,
    source_rows: &[TableRow],
    target_rows: &mut Vec<TableRow>,
    now: DateTime<Utc>,
) -> VaultResult<u64> {
    // Matching sees the target as it was before the statement.
    let snapshot_len = target_rows.len();
    let mut matched_by = vec![false; snapshot_len];
    let mut inserts = Vec::new();
    let mut rows_affected = 0;

    for source_row in source_rows {
        let matches: Vec<usize> = (0..snapshot_len)
            .filter(|&index| rows_match(&plan.on, source_row, &target_rows[index]))
            .collect();

        if matches.is_empty() {
            if let Some(NotMatchedAction::Insert(assignments)) = &plan.when_not_matched {
                let mut row = TableRow::new();
                assign(&mut row, assignments, source_row, now);
                inserts.push(row);
                rows_affected += 1;
            }
            continue;
        }

        let Some(MatchedAction::Update(assignments)) = &plan.when_matched else {
            continue;
        };

        for index in matches {
            if matched_by[index] {
                bail!(
                    ErrorKind::InvalidData,
                    "Merge would update the same target row twice",
                    format!(
                        "more than one source row of `{}` matches a row of `{}`",
                        plan.source.stream, plan.target
                    )
                );
            }
            matched_by[index] = true;
            assign(&mut target_rows[index], assignments, source_row, now);
            rows_affected += 1;
        }
    }

    target_rows.extend(inserts);

    Ok(rows_affected)
}

/// Equality on every `on` column. Nulls never match, as in SQL.
fn rows_match(on: &[String], source_row: &TableRow, target_row: &TableRow) -> bool {
    on.iter().all(|column| {
        let source_value = source_row.get(column);
        !source_value.is_null() && source_value == target_row.get(column)
    })
}

fn assign(row: &mut TableRow, assignments: &[Assignment], source_row: &TableRow, now: DateTime<Utc>) {
    for assignment in assignments {
        let value = match &assignment.value {
            ActionValue::Source(column) => source_row.get(column).clone(),
            ActionValue::CurrentTimestamp => Cell::TimestampTz(now),
            ActionValue::Literal(value) => Cell::String(value.clone()),
        };
        row.set(assignment.column.clone(), value);
    }
}
