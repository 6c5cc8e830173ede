use tracing::warn;

use crate::types::ObjectName;

/// Placeholder for satellite loading. Logs the invocation and performs no merge.
pub fn load_satellite(target: &ObjectName, stream: &ObjectName, attributes: &[String]) {
    warn!(
        table = %target,
        %stream,
        attributes = ?attributes,
        "satellite loading is not implemented, skipping table"
    );
}
