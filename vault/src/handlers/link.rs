use tracing::warn;

use crate::types::ObjectName;

/// Placeholder for link loading. Logs the invocation and performs no merge.
pub fn load_link(target: &ObjectName, stream: &ObjectName, parent_hubs: &[String]) {
    warn!(
        table = %target,
        %stream,
        parent_hubs = ?parent_hubs,
        "link loading is not implemented, skipping table"
    );
}
