use std::fmt;

use serde::{Deserialize, Serialize};

/// Data Vault entity kind of a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Hub,
    Link,
    Satellite,
    Reference,
}

impl TableKind {
    /// Name prefixes that identify a kind when no explicit kind is configured.
    const PREFIXES: [(&'static str, TableKind); 4] = [
        ("HUB", TableKind::Hub),
        ("LNK", TableKind::Link),
        ("SAT", TableKind::Satellite),
        ("REF", TableKind::Reference),
    ];

    /// Derives the kind from the naming convention of the target table.
    ///
    /// The match is case-sensitive and anchored at the start of the unqualified name, so
    /// `HUB_CUSTOMER` is a hub while `XHUB` and `hub_customer` have no kind.
    pub fn from_table_name(table_name: &str) -> Option<TableKind> {
        let unqualified = table_name.rsplit('.').next().unwrap_or(table_name);

        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| unqualified.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Hub => "hub",
            TableKind::Link => "link",
            TableKind::Satellite => "satellite",
            TableKind::Reference => "reference",
        }
    }

    /// Whether tables of this kind are keyed by a hash key column.
    pub fn requires_hash_key(&self) -> bool {
        !matches!(self, TableKind::Reference)
    }

    /// Whether tables of this kind store business key columns.
    pub fn requires_business_key(&self) -> bool {
        matches!(self, TableKind::Hub | TableKind::Reference)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more business key columns, written either as a string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BusinessKeyColumns {
    Single(String),
    Composite(Vec<String>),
}

impl BusinessKeyColumns {
    pub fn columns(&self) -> Vec<String> {
        match self {
            BusinessKeyColumns::Single(column) => vec![column.clone()],
            BusinessKeyColumns::Composite(columns) => columns.clone(),
        }
    }

    /// Whether at least one column is configured and none of them is blank.
    pub fn is_valid(&self) -> bool {
        match self {
            BusinessKeyColumns::Single(column) => !column.trim().is_empty(),
            BusinessKeyColumns::Composite(columns) => {
                !columns.is_empty() && columns.iter().all(|column| !column.trim().is_empty())
            }
        }
    }
}

/// Configuration of a single vault target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TableConfig {
    /// Possibly qualified name of the table that is written, e.g. `HUB_CUSTOMER`.
    pub target_table: String,
    /// Possibly qualified name of the change stream that feeds the table.
    pub source_stream: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_key: Option<BusinessKeyColumns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_key: Option<String>,
    /// Explicit kind. When absent the kind is derived from the target table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TableKind>,
    /// Hubs related by a link table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_hubs: Vec<String>,
    /// Descriptive columns tracked by a satellite table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl TableConfig {
    /// Returns the configured kind or the kind implied by the table name prefix.
    pub fn resolved_kind(&self) -> Option<TableKind> {
        self.kind
            .or_else(|| TableKind::from_table_name(&self.target_table))
    }

    /// Whether `column` is one of the business key, hash key or attribute columns.
    pub fn references_column(&self, column: &str) -> bool {
        let in_business_key = self
            .business_key
            .as_ref()
            .is_some_and(|business_key| business_key.columns().iter().any(|c| c == column));

        in_business_key
            || self.hash_key.as_deref() == Some(column)
            || self.attributes.iter().any(|attribute| attribute == column)
    }
}
