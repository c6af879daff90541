//! ZooKeeper-backed znode store for zkmirror.
//!
//! [`ZkClient`] implements [`ZnodeStore`](zkmirror_core::ZnodeStore) on top
//! of the `zookeeper` crate. Calls block until the ensemble answers. Wrap
//! the client in a [`Session`](zkmirror_core::Session) so it is closed on
//! every exit path.
//!
//! # Example
//!
//! ```rust,no_run
//! use zkmirror_client::ZkClient;
//! use zkmirror_core::{ConnectConfig, Session, ZnodePath, ZnodeStore};
//!
//! let client = ZkClient::connect(&ConnectConfig::new("localhost:2181")).unwrap();
//! let session = Session::new(client);
//! let children = session.list_children(&ZnodePath::root()).unwrap();
//! println!("{children:?}");
//! session.close().unwrap();
//! ```

mod client;

pub use client::ZkClient;
