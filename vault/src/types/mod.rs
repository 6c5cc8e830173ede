//! Core value types shared by the registry, the merge plans and the engines.

mod cell;
mod object_name;
mod row;

pub use cell::Cell;
pub use object_name::ObjectName;
pub use row::{ChangeKind, ChangeRow, TableRow};
