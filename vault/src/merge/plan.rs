use config::shared::HashAlgorithm;

use crate::types::ObjectName;

/// Expression producing one column of the merge source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceExpr {
    /// A column of the change stream, copied as is.
    Column(String),
    /// Hex digest of the text form of the given stream columns.
    Digest {
        algorithm: HashAlgorithm,
        columns: Vec<String>,
    },
    /// The statement's processing time.
    CurrentTimestamp,
    /// A constant string.
    Literal(String),
}

/// A named column of the merge source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    pub expr: SourceExpr,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, expr: SourceExpr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// The projected, de-duplicated change rows a merge reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSource {
    pub stream: ObjectName,
    /// Columns of the source relation. Columns of the stream that are not listed, such as
    /// the change kind marker, are dropped.
    pub columns: Vec<SourceColumn>,
    /// Stream columns that must be non-null for a row to take part in the merge.
    pub non_null: Vec<String>,
}

impl MergeSource {
    pub fn column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Value written into a target column by a merge action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionValue {
    /// A column of the merge source.
    Source(String),
    /// The statement's processing time.
    CurrentTimestamp,
    Literal(String),
}

/// Assignment of a value to a target column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: ActionValue,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: ActionValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }

    /// Copies the source column of the same name into the target.
    pub fn from_source(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            value: ActionValue::Source(column.clone()),
            column,
        }
    }
}

/// Action taken when a source row matches a target row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedAction {
    Update(Vec<Assignment>),
}

/// Action taken when a source row matches no target row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotMatchedAction {
    Insert(Vec<Assignment>),
}

/// A conditional upsert of a vault table from a change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub target: ObjectName,
    pub source: MergeSource,
    /// Columns compared for equality between source and target rows.
    pub on: Vec<String>,
    /// [`None`] leaves matched target rows untouched.
    pub when_matched: Option<MatchedAction>,
    /// [`None`] never inserts.
    pub when_not_matched: Option<NotMatchedAction>,
}

/// What a merge did to the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    pub rows_affected: u64,
}
