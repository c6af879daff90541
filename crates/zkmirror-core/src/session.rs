//! Scoped ownership of a store for the length of one command.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::ZnodeStore;

/// Owns a [`ZnodeStore`] and closes it exactly once.
///
/// Call [`Session::close`] to observe close errors; otherwise the store is
/// closed when the session is dropped, including on early `?` returns.
pub struct Session<S: ZnodeStore> {
    store: S,
    closed: bool,
}

impl<S: ZnodeStore> Session<S> {
    /// Take ownership of an open store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            closed: false,
        }
    }

    /// Close the store and report the outcome.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.store.close()
    }
}

impl<S: ZnodeStore> Deref for Session<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.store
    }
}

impl<S: ZnodeStore> DerefMut for Session<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: ZnodeStore> Drop for Session<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("Closing ZooKeeper session");
        if let Err(err) = self.store.close() {
            warn!("Failed to close ZooKeeper session: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEnsemble;
    use crate::path::ZnodePath;

    #[test]
    fn test_close_on_drop() {
        let ensemble = MemoryEnsemble::new();
        {
            let session = Session::new(ensemble.clone());
            assert!(session.exists(&ZnodePath::root()).unwrap());
        }
        assert!(ensemble.is_closed());
    }

    #[test]
    fn test_explicit_close() {
        let ensemble = MemoryEnsemble::new();
        let session = Session::new(ensemble.clone());
        session.close().unwrap();
        assert!(ensemble.is_closed());
        assert_eq!(ensemble.close_count(), 1);
    }

    #[test]
    fn test_close_on_error_path() {
        fn failing(ensemble: MemoryEnsemble) -> Result<(), StoreError> {
            let session = Session::new(ensemble);
            session.get_data(&ZnodePath::parse("/missing").unwrap())?;
            Ok(())
        }

        let ensemble = MemoryEnsemble::new();
        assert!(failing(ensemble.clone()).is_err());
        assert!(ensemble.is_closed());
        assert_eq!(ensemble.close_count(), 1);
    }
}
