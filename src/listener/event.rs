use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// One row change applied to `table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub table: String,
    pub operation: Operation,
}

impl Change {
    pub fn new(
        table: impl Into<String>,
        operation: Operation,
    ) -> Self {
        Self {
            table: table.into(),
            operation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Rows already applied to the active database
    ChangeList { changes: Vec<Change> },

    /// A new database version is ready to serve reads
    Snapshot { version: String },
}
