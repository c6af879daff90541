//! The connector interface the mirroring procedures consume.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::path::ZnodePath;

/// Metadata returned alongside a znode's payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStat {
    /// Length of the data payload in bytes.
    pub data_length: u32,
    /// Data version, bumped on every successful set.
    pub version: i32,
    /// Number of direct children.
    pub num_children: u32,
}

impl NodeStat {
    /// Whether the node carries a non-empty payload.
    pub fn has_data(&self) -> bool {
        self.data_length > 0
    }
}

/// Result of trying to overwrite a znode's payload.
#[derive(Debug)]
pub enum SetOutcome {
    /// The payload was replaced.
    Updated,
    /// The znode does not exist.
    NotFound,
    /// Any other failure.
    Failed(StoreError),
}

impl From<Result<(), StoreError>> for SetOutcome {
    fn from(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::Updated,
            Err(err) if err.is_no_node() => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }
}

/// A hierarchical znode namespace: a ZooKeeper ensemble or a stand-in.
///
/// Calls block until the server answers.
pub trait ZnodeStore {
    /// Names of the direct children of `path`.
    fn list_children(&self, path: &ZnodePath) -> Result<Vec<String>, StoreError>;

    /// Payload and metadata of `path`.
    fn get_data(&self, path: &ZnodePath) -> Result<(Vec<u8>, NodeStat), StoreError>;

    /// Whether `path` exists.
    fn exists(&self, path: &ZnodePath) -> Result<bool, StoreError>;

    /// Overwrite the payload of an existing znode.
    fn set_data(&mut self, path: &ZnodePath, data: &[u8]) -> SetOutcome;

    /// Create a persistent znode.
    ///
    /// Fails with [`StoreError::NoNode`] when the parent is missing and with
    /// [`StoreError::NodeExists`] when the node is already present.
    fn create_node(&mut self, path: &ZnodePath, data: &[u8]) -> Result<(), StoreError>;

    /// Release the underlying session.
    fn close(&mut self) -> Result<(), StoreError>;
}
