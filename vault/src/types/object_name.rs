use std::fmt;

use pg_escape::quote_identifier;

use crate::bail;
use crate::error::{ErrorKind, VaultResult};

/// Name of a warehouse object, optionally qualified by database and schema.
///
/// Names are kept exactly as configured. `DV_LAB.L00_STG.STG_ORDER_STRM_OUTBOUND` is stored as
/// three parts and each part is quoted individually when rendered into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName {
    parts: Vec<String>,
}

impl ObjectName {
    /// Parses a dot separated name, rejecting empty parts.
    pub fn parse(name: &str) -> VaultResult<ObjectName> {
        let parts: Vec<String> = name.split('.').map(|part| part.trim().to_string()).collect();

        if parts.iter().any(|part| part.is_empty()) {
            bail!(
                ErrorKind::ConfigError,
                "Object name contains an empty part",
                format!("the name `{name}` is not a valid object name")
            );
        }

        Ok(ObjectName { parts })
    }

    /// Unqualified name, i.e. the last part.
    pub fn name(&self) -> &str {
        // Parsing guarantees at least one part.
        &self.parts[self.parts.len() - 1]
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Renders the name with every part quoted as a SQL identifier.
    pub fn to_quoted_sql(&self) -> String {
        self.parts
            .iter()
            .map(|part| quote_identifier(part).into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}
