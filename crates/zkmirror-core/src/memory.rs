//! In-process znode store.
//!
//! Behaves like a single-node ensemble with persistent nodes only: the root
//! always exists, creating a node requires its parent, and versions bump on
//! every set. Clones share state, so a handle kept outside a [`Session`]
//! can inspect the store after the session has consumed its own copy.
//!
//! [`Session`]: crate::Session

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;
use crate::path::ZnodePath;
use crate::store::{NodeStat, SetOutcome, ZnodeStore};

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    data: Vec<u8>,
    version: i32,
}

#[derive(Debug)]
struct EnsembleState {
    nodes: BTreeMap<ZnodePath, MemoryNode>,
    set_count: usize,
    create_count: usize,
    close_count: usize,
}

impl Default for EnsembleState {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ZnodePath::root(), MemoryNode::default());
        Self {
            nodes,
            set_count: 0,
            create_count: 0,
            close_count: 0,
        }
    }
}

impl EnsembleState {
    fn children_of(&self, path: &ZnodePath) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|candidate| candidate.parent().as_ref() == Some(path))
            .filter_map(|child| child.name().map(str::to_string))
            .collect()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.close_count > 0 {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Shared-state in-memory [`ZnodeStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryEnsemble {
    inner: Arc<Mutex<EnsembleState>>,
}

impl MemoryEnsemble {
    /// Create an ensemble holding only an empty root.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EnsembleState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a node, creating missing ancestors with no data.
    ///
    /// Seeding helper: does not count towards [`set_count`](Self::set_count)
    /// or [`create_count`](Self::create_count).
    pub fn insert(&self, path: &ZnodePath, data: impl Into<Vec<u8>>) {
        let mut state = self.state();
        for ancestor in path.ancestors() {
            state.nodes.entry(ancestor).or_default();
        }
        let node = state.nodes.entry(path.clone()).or_default();
        node.data = data.into();
    }

    /// Current payload of a node.
    pub fn data(&self, path: &ZnodePath) -> Option<Vec<u8>> {
        self.state().nodes.get(path).map(|node| node.data.clone())
    }

    /// Every node path, root included, in sorted order.
    pub fn paths(&self) -> Vec<ZnodePath> {
        self.state().nodes.keys().cloned().collect()
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.state().nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Successful `set_data` calls so far.
    pub fn set_count(&self) -> usize {
        self.state().set_count
    }

    /// Successful `create_node` calls so far.
    pub fn create_count(&self) -> usize {
        self.state().create_count
    }

    /// Times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    /// Whether the store has been closed.
    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl ZnodeStore for MemoryEnsemble {
    fn list_children(&self, path: &ZnodePath) -> Result<Vec<String>, StoreError> {
        let state = self.state();
        state.ensure_open()?;
        if !state.nodes.contains_key(path) {
            return Err(StoreError::NoNode { path: path.clone() });
        }
        Ok(state.children_of(path))
    }

    fn get_data(&self, path: &ZnodePath) -> Result<(Vec<u8>, NodeStat), StoreError> {
        let state = self.state();
        state.ensure_open()?;
        let node = state
            .nodes
            .get(path)
            .ok_or_else(|| StoreError::NoNode { path: path.clone() })?;
        let stat = NodeStat {
            data_length: node.data.len() as u32,
            version: node.version,
            num_children: state.children_of(path).len() as u32,
        };
        Ok((node.data.clone(), stat))
    }

    fn exists(&self, path: &ZnodePath) -> Result<bool, StoreError> {
        let state = self.state();
        state.ensure_open()?;
        Ok(state.nodes.contains_key(path))
    }

    fn set_data(&mut self, path: &ZnodePath, data: &[u8]) -> SetOutcome {
        let mut state = self.state();
        if let Err(err) = state.ensure_open() {
            return SetOutcome::Failed(err);
        }
        match state.nodes.get_mut(path) {
            Some(node) => {
                node.data = data.to_vec();
                node.version += 1;
                state.set_count += 1;
                SetOutcome::Updated
            }
            None => SetOutcome::NotFound,
        }
    }

    fn create_node(&mut self, path: &ZnodePath, data: &[u8]) -> Result<(), StoreError> {
        let mut state = self.state();
        state.ensure_open()?;
        if state.nodes.contains_key(path) {
            return Err(StoreError::NodeExists { path: path.clone() });
        }
        match path.parent() {
            Some(parent) if state.nodes.contains_key(&parent) => {}
            _ => return Err(StoreError::NoNode { path: path.clone() }),
        }
        state.nodes.insert(
            path.clone(),
            MemoryNode {
                data: data.to_vec(),
                version: 0,
            },
        );
        state.create_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.state().close_count += 1;
        Ok(())
    }
}
