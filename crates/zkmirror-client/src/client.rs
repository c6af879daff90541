//! `ZnodeStore` backed by a live ZooKeeper ensemble.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};
use zookeeper::{Acl, CreateMode, Stat, WatchedEvent, Watcher, ZkError, ZooKeeper};

use zkmirror_core::{ConnectConfig, NodeStat, SetOutcome, StoreError, ZnodePath, ZnodeStore};

/// Logs session events; no watches are ever set.
struct SessionWatcher;

impl Watcher for SessionWatcher {
    fn handle(&self, event: WatchedEvent) {
        debug!("ZooKeeper event: {event:?}");
    }
}

/// A ZooKeeper session.
pub struct ZkClient {
    zk: Arc<ZooKeeper>,
    address: String,
}

impl ZkClient {
    /// Open a session and wait until the ensemble answers.
    ///
    /// An ensemble that does not answer within the session timeout yields
    /// [`StoreError::Connection`]. The pending attempt is left to the
    /// client's background thread; if a session is established after the
    /// timeout it is closed as soon as the ensemble answers.
    pub fn connect(config: &ConnectConfig) -> Result<Self, StoreError> {
        info!("Connecting to ZooKeeper at {}", config.address);

        let zk = ZooKeeper::connect(&config.address, config.session_timeout, SessionWatcher)
            .map_err(|e| StoreError::connection(format!("{}: {e:?}", config.address)))?;
        let zk = Arc::new(zk);

        // The client queues requests until a server accepts the session.
        let probe = Arc::clone(&zk);
        let late = Arc::clone(&zk);
        let answer = wait_for(
            config.session_timeout,
            move || probe.exists("/", false),
            move |_| {
                debug!("Closing session established after the connect timeout");
                let _ = late.close();
            },
        );

        match answer {
            Some(Ok(_)) => {
                debug!("Connected to {}", config.address);
                Ok(Self {
                    zk,
                    address: config.address.clone(),
                })
            }
            Some(Err(err)) => Err(StoreError::connection(format!(
                "{}: {err:?}",
                config.address
            ))),
            None => Err(StoreError::connection(format!(
                "{}: no response within {:?}",
                config.address, config.session_timeout
            ))),
        }
    }

    /// Connection string this session was opened with.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl ZnodeStore for ZkClient {
    fn list_children(&self, path: &ZnodePath) -> Result<Vec<String>, StoreError> {
        self.zk
            .get_children(path.as_str(), false)
            .map_err(|e| store_error(e, path))
    }

    fn get_data(&self, path: &ZnodePath) -> Result<(Vec<u8>, NodeStat), StoreError> {
        let (data, stat) = self
            .zk
            .get_data(path.as_str(), false)
            .map_err(|e| store_error(e, path))?;
        Ok((data, node_stat(&stat)))
    }

    fn exists(&self, path: &ZnodePath) -> Result<bool, StoreError> {
        self.zk
            .exists(path.as_str(), false)
            .map(|stat| stat.is_some())
            .map_err(|e| store_error(e, path))
    }

    fn set_data(&mut self, path: &ZnodePath, data: &[u8]) -> SetOutcome {
        self.zk
            .set_data(path.as_str(), data.to_vec(), None)
            .map(|_| ())
            .map_err(|e| store_error(e, path))
            .into()
    }

    fn create_node(&mut self, path: &ZnodePath, data: &[u8]) -> Result<(), StoreError> {
        self.zk
            .create(
                path.as_str(),
                data.to_vec(),
                Acl::open_unsafe().clone(),
                CreateMode::Persistent,
            )
            .map(|_| ())
            .map_err(|e| store_error(e, path))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        debug!("Closing session to {}", self.address);
        self.zk
            .close()
            .map_err(|e| StoreError::connection(format!("{}: {e:?}", self.address)))
    }
}

/// Run `work` on a helper thread and wait up to `timeout` for its result.
///
/// Returns `None` on timeout. A result that arrives after the caller gave up
/// is handed to `abandon`.
fn wait_for<T, W, A>(timeout: Duration, work: W, abandon: A) -> Option<T>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    A: FnOnce(T) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Err(mpsc::SendError(result)) = tx.send(work()) {
            abandon(result);
        }
    });
    rx.recv_timeout(timeout).ok()
}

fn node_stat(stat: &Stat) -> NodeStat {
    NodeStat {
        data_length: stat.data_length.max(0) as u32,
        version: stat.version,
        num_children: stat.num_children.max(0) as u32,
    }
}

/// Map a client error for `path` onto the store error taxonomy.
pub(crate) fn store_error(err: ZkError, path: &ZnodePath) -> StoreError {
    match err {
        ZkError::NoNode => StoreError::NoNode { path: path.clone() },
        ZkError::NodeExists => StoreError::NodeExists { path: path.clone() },
        ZkError::ConnectionLoss | ZkError::SessionExpired | ZkError::OperationTimeout => {
            StoreError::connection(format!("{err:?} at {path}"))
        }
        other => StoreError::Other {
            path: path.clone(),
            message: format!("{other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ZnodePath {
        ZnodePath::parse(s).unwrap()
    }

    #[test]
    fn test_store_error_mapping() {
        let p = path("/a/b");

        assert_eq!(
            store_error(ZkError::NoNode, &p),
            StoreError::NoNode { path: p.clone() }
        );
        assert_eq!(
            store_error(ZkError::NodeExists, &p),
            StoreError::NodeExists { path: p.clone() }
        );
        assert!(matches!(
            store_error(ZkError::ConnectionLoss, &p),
            StoreError::Connection { .. }
        ));
        assert!(matches!(
            store_error(ZkError::SessionExpired, &p),
            StoreError::Connection { .. }
        ));
        assert!(matches!(
            store_error(ZkError::NoAuth, &p),
            StoreError::Other { .. }
        ));
    }

    #[test]
    fn test_wait_for_returns_prompt_result() {
        let answer = wait_for(Duration::from_secs(5), || 42, |_| panic!("not abandoned"));
        assert_eq!(answer, Some(42));
    }

    #[test]
    fn test_wait_for_hands_late_result_to_abandon() {
        let (tx, rx) = mpsc::channel();
        let answer = wait_for(
            Duration::from_millis(10),
            || {
                thread::sleep(Duration::from_millis(200));
                "late"
            },
            move |result| tx.send(result).unwrap(),
        );

        assert_eq!(answer, None);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("late"));
    }

    #[test]
    fn test_set_outcome_from_no_node() {
        let outcome = SetOutcome::from(Err::<(), _>(store_error(ZkError::NoNode, &path("/x"))));
        assert!(matches!(outcome, SetOutcome::NotFound));

        let outcome = SetOutcome::from(Err::<(), _>(store_error(ZkError::BadVersion, &path("/x"))));
        assert!(matches!(outcome, SetOutcome::Failed(StoreError::Other { .. })));
    }
}
