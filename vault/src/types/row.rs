use std::collections::BTreeMap;
use std::fmt;

use crate::types::Cell;

/// A row of named column values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    values: BTreeMap<String, Cell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the row with `column` set to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Cell>) {
        self.values.insert(column.into(), value.into());
    }

    /// Value of `column`. Missing columns read as [`Cell::Null`].
    pub fn get(&self, column: &str) -> &Cell {
        self.values.get(column).unwrap_or(&Cell::Null)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Kind of change recorded by a change stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    /// Text stored in the change kind column of a stream.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending row of a change stream.
///
/// The change kind travels next to the row so that merges can project it away; every
/// change row is treated as a candidate insert regardless of its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub kind: ChangeKind,
    pub row: TableRow,
}

impl ChangeRow {
    pub fn insert(row: TableRow) -> Self {
        Self {
            kind: ChangeKind::Insert,
            row,
        }
    }

    pub fn update(row: TableRow) -> Self {
        Self {
            kind: ChangeKind::Update,
            row,
        }
    }

    pub fn delete(row: TableRow) -> Self {
        Self {
            kind: ChangeKind::Delete,
            row,
        }
    }

    /// The row as seen by a merge: business columns only, no change marker.
    pub fn projected(&self) -> &TableRow {
        &self.row
    }

    /// The row as stored in the stream, including the change kind column.
    pub fn with_marker(&self, change_kind_column: &str) -> TableRow {
        self.row
            .clone()
            .with(change_kind_column, self.kind.as_str())
    }
}
