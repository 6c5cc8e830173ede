use config::shared::{BusinessKeyColumns, TableConfig, TableKind};

use crate::types::{ChangeRow, TableRow};

/// Hub configuration with a single-column business key and a `SHA1_<target>` hash key.
pub fn hub_config(target: &str, stream: &str, business_key: &str) -> TableConfig {
    TableConfig {
        target_table: target.to_string(),
        source_stream: stream.to_string(),
        business_key: Some(BusinessKeyColumns::Single(business_key.to_string())),
        hash_key: Some(format!("SHA1_{target}")),
        kind: None,
        parent_hubs: vec![],
        attributes: vec![],
    }
}

/// Reference configuration keyed by `business_key`.
pub fn reference_config(target: &str, stream: &str, business_key: &[&str]) -> TableConfig {
    TableConfig {
        target_table: target.to_string(),
        source_stream: stream.to_string(),
        business_key: Some(BusinessKeyColumns::Composite(
            business_key.iter().map(|column| column.to_string()).collect(),
        )),
        hash_key: None,
        kind: Some(TableKind::Reference),
        parent_hubs: vec![],
        attributes: vec![],
    }
}

/// Link configuration over the given parent hubs.
pub fn link_config(target: &str, stream: &str, parent_hubs: &[&str]) -> TableConfig {
    TableConfig {
        target_table: target.to_string(),
        source_stream: stream.to_string(),
        business_key: None,
        hash_key: Some(format!("SHA1_{target}")),
        kind: None,
        parent_hubs: parent_hubs.iter().map(|hub| hub.to_string()).collect(),
        attributes: vec![],
    }
}

/// Satellite configuration carrying the given attributes.
pub fn satellite_config(target: &str, stream: &str, attributes: &[&str]) -> TableConfig {
    TableConfig {
        target_table: target.to_string(),
        source_stream: stream.to_string(),
        business_key: None,
        hash_key: Some(format!("SHA1_{target}")),
        kind: None,
        parent_hubs: vec![],
        attributes: attributes.iter().map(|column| column.to_string()).collect(),
    }
}

/// One inserted change row per key, stored under `column`.
pub fn inserted_keys(column: &str, keys: &[&str]) -> Vec<ChangeRow> {
    keys.iter()
        .map(|key| ChangeRow::insert(TableRow::new().with(column, *key)))
        .collect()
}
