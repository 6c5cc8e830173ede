use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No tables are configured, so a run would do nothing.
    #[error("`tables` must contain at least one table")]
    NoTables,
    /// A target table or source stream name is empty.
    #[error("table #{index} has an empty `{field}`")]
    EmptyName { index: usize, field: &'static str },
    /// Two table entries write to the same target table.
    #[error("target table `{0}` is configured more than once")]
    DuplicateTargetTable(String),
    /// The table kind is neither configured nor derivable from the name prefix.
    #[error(
        "table `{0}` has no `kind` and its name does not start with `HUB`, `LNK`, `SAT` or `REF`"
    )]
    UnknownTableKind(String),
    /// A hub or reference table lacks business key columns.
    #[error("table `{0}` requires at least one non-empty `business_key` column")]
    MissingBusinessKey(String),
    /// A hub, link or satellite table lacks a hash key column.
    #[error("table `{0}` requires a `hash_key` column")]
    MissingHashKey(String),
    /// A table loads the change stream's change kind column, which is never part of the
    /// merge source.
    #[error("table `{table}` uses the change kind column `{column}` as a key or attribute")]
    ChangeKindColumnReferenced { table: String, column: String },
    /// The warehouse password is empty.
    #[error("`engine.connection.password` must not be empty")]
    EmptyPassword,
    /// The schema holding the `pgcrypto` extension is empty.
    #[error("`engine.connection.pgcrypto_schema` must not be empty")]
    EmptyPgcryptoSchema,
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
    /// A metadata column name is empty.
    #[error("`metadata.{0}` must not be empty")]
    EmptyMetadataColumn(&'static str),
}
