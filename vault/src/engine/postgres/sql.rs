//! Rendering of merge plans into Postgres statements.
//!
//! Requires Postgres 15 or later for `MERGE`. SHA-1 digests use `digest` from the `pgcrypto`
//! extension, called qualified with the schema it is installed in. SHA-256 digests use the
//! built-in `sha256`.

use config::shared::HashAlgorithm;
use pg_escape::{quote_identifier, quote_literal};

use crate::hash::COMPOSITE_KEY_DELIMITER;
use crate::merge::{
    ActionValue, Assignment, MatchedAction, MergePlan, MergeSource, NotMatchedAction, SourceExpr,
};
use crate::types::ObjectName;

const TARGET_ALIAS: &str = "tgt";
const SOURCE_ALIAS: &str = "src";

/// Query returning a single boolean that is true when `stream` holds any row.
pub fn render_pending_changes_query(stream: &ObjectName) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM {} LIMIT 1)",
        stream.to_quoted_sql()
    )
}

/// Renders `plan` as a single `MERGE` statement.
///
/// `pgcrypto_schema` is the schema holding the `pgcrypto` functions.
pub fn render_merge(plan: &MergePlan, pgcrypto_schema: &str) -> String {
    let mut clauses = vec![
        format!(
            "MERGE INTO {} AS {TARGET_ALIAS}",
            plan.target.to_quoted_sql()
        ),
        format!("USING ({}) AS {SOURCE_ALIAS}", render_source(&plan.source, pgcrypto_schema)),
        format!("ON {}", render_join_condition(&plan.on)),
    ];

    if let Some(MatchedAction::Update(assignments)) = &plan.when_matched {
        let set = assignments
            .iter()
            .map(|assignment| {
                format!(
                    "{} = {}",
                    quote_identifier(&assignment.column),
                    render_action_value(&assignment.value)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        clauses.push(format!("WHEN MATCHED THEN UPDATE SET {set}"));
    }

    if let Some(NotMatchedAction::Insert(assignments)) = &plan.when_not_matched {
        clauses.push(render_insert(assignments));
    }

    clauses.join("\n")
}

fn render_source(source: &MergeSource, pgcrypto_schema: &str) -> String {
    let columns = source
        .columns
        .iter()
        .map(|column| {
            format!(
                "{} AS {}",
                render_source_expr(&column.expr, pgcrypto_schema),
                quote_identifier(&column.name)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut select = format!(
        "SELECT DISTINCT {columns} FROM {}",
        source.stream.to_quoted_sql()
    );

    if !source.non_null.is_empty() {
        let predicate = source
            .non_null
            .iter()
            .map(|column| format!("{} IS NOT NULL", quote_identifier(column)))
            .collect::<Vec<_>>()
            .join(" AND ");
        select.push_str(" WHERE ");
        select.push_str(&predicate);
    }

    select
}

fn render_source_expr(expr: &SourceExpr, pgcrypto_schema: &str) -> String {
    match expr {
        SourceExpr::Column(name) => quote_identifier(name).into_owned(),
        SourceExpr::Digest { algorithm, columns } => {
            render_digest(*algorithm, columns, pgcrypto_schema)
        }
        SourceExpr::CurrentTimestamp => "current_timestamp".to_string(),
        SourceExpr::Literal(value) => quote_literal(value),
    }
}

/// Lower-case hex digest of the text form of `columns`, joined like composite keys are hashed
/// in process.
fn render_digest(algorithm: HashAlgorithm, columns: &[String], pgcrypto_schema: &str) -> String {
    let texts: Vec<String> = columns
        .iter()
        .map(|column| format!("{}::text", quote_identifier(column)))
        .collect();

    let text = match texts.as_slice() {
        [single] => single.clone(),
        _ => format!(
            "concat_ws({}, {})",
            quote_literal(COMPOSITE_KEY_DELIMITER),
            texts.join(", ")
        ),
    };
    let bytes = format!("convert_to({text}, 'UTF8')");

    match algorithm {
        HashAlgorithm::Sha1 => format!(
            "encode({}.digest({bytes}, 'sha1'), 'hex')",
            quote_identifier(pgcrypto_schema)
        ),
        HashAlgorithm::Sha256 => format!("encode(sha256({bytes}), 'hex')"),
    }
}

fn render_join_condition(on: &[String]) -> String {
    on.iter()
        .map(|column| {
            let column = quote_identifier(column);
            format!("{TARGET_ALIAS}.{column} = {SOURCE_ALIAS}.{column}")
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn render_action_value(value: &ActionValue) -> String {
    match value {
        ActionValue::Source(column) => format!("{SOURCE_ALIAS}.{}", quote_identifier(column)),
        ActionValue::CurrentTimestamp => "current_timestamp".to_string(),
        ActionValue::Literal(value) => quote_literal(value),
    }
}

fn render_insert(assignments: &[Assignment]) -> String {
    let columns = assignments
        .iter()
        .map(|assignment| quote_identifier(&assignment.column).into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    let values = assignments
        .iter()
        .map(|assignment| render_action_value(&assignment.value))
        .collect::<Vec<_>>()
        .join(", ");

    format!("WHEN NOT MATCHED THEN INSERT ({columns}) VALUES ({values})")
}
