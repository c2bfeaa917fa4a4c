//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use app_bootstrap::config::{DbKind, DbProperties};
use app_bootstrap::context::Context;
use app_bootstrap::datasource::{
    Datasource, DatasourceError, EntityDescriptor, StoreDriver,
};

/// Create a classpath directory holding the given `(file name, json)` documents.
pub fn classpath(documents: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, json) in documents {
        write_document(dir.path(), name, json);
    }
    dir
}

pub fn write_document(dir: &Path, name: &str, json: &str) {
    std::fs::write(dir.join(name), json).unwrap();
}

/// Backing state shared by every handle of a [`MemoryDriver`].
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<String>>,
    pub connects: AtomicUsize,
    pub creates: AtomicUsize,
    pub closes: AtomicUsize,
}

impl MemoryStore {
    pub fn objects(&self) -> Vec<String> {
        self.objects.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct MemoryHandle {
    pub store: Arc<MemoryStore>,
}

/// In-memory stand-in for a datastore driver.
pub struct MemoryDriver {
    pub kind: DbKind,
    pub store: Arc<MemoryStore>,
    pub fail_ping: bool,
    pub fail_on: Option<String>,
}

impl MemoryDriver {
    pub fn new(kind: DbKind) -> Self {
        Self::with_store(kind, Arc::new(MemoryStore::default()))
    }

    pub fn with_store(kind: DbKind, store: Arc<MemoryStore>) -> Self {
        Self {
            kind,
            store,
            fail_ping: false,
            fail_on: None,
        }
    }
}

#[async_trait]
impl StoreDriver for MemoryDriver {
    type Handle = MemoryHandle;

    fn kind(&self) -> DbKind {
        self.kind
    }

    async fn connect(&self, _props: &DbProperties) -> Result<MemoryHandle, DatasourceError> {
        self.store.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryHandle {
            store: self.store.clone(),
        })
    }

    async fn ping(
        &self,
        _handle: &MemoryHandle,
        _props: &DbProperties,
    ) -> Result<Option<String>, DatasourceError> {
        if self.fail_ping {
            return Err(DatasourceError::Liveness {
                kind: self.kind,
                source: "ping refused".into(),
            });
        }
        Ok(Some("memory 1.0".to_string()))
    }

    async fn provision(
        &self,
        handle: &MemoryHandle,
        _props: &DbProperties,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatasourceError> {
        let mut objects = handle.store.objects.lock().unwrap();
        for entity in entities {
            if self.fail_on.as_deref() == Some(entity.name()) {
                return Err(DatasourceError::Provisioning {
                    entity: entity.name().to_string(),
                    source: "permission denied".into(),
                });
            }
            if !objects.iter().any(|o| o == entity.name()) {
                objects.push(entity.name().to_string());
                handle.store.creates.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    async fn close(&self, handle: MemoryHandle) -> Result<(), DatasourceError> {
        handle.store.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Database properties naming `database`.
pub fn db_properties(kind: DbKind, database: &str) -> DbProperties {
    let mut props = DbProperties::for_kind(kind);
    props.database = database.to_string();
    props
}

/// A datasource that only records the calls it receives.
///
/// Once [`RecordingDatasource::watch`] names the server address, `stop` also
/// records whether that address still accepted connections at the time.
#[derive(Clone, Default)]
pub struct RecordingDatasource {
    pub events: Arc<Mutex<Vec<&'static str>>>,
    pub fail_stop: bool,
    pub watched: Arc<Mutex<Option<SocketAddr>>>,
    pub reachable_at_stop: Arc<Mutex<Option<bool>>>,
}

impl RecordingDatasource {
    pub fn failing_stop() -> Self {
        Self {
            fail_stop: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn watch(&self, addr: SocketAddr) {
        *self.watched.lock().unwrap() = Some(addr);
    }

    /// Whether the watched server accepted a connection during `stop`.
    pub fn reachable_at_stop(&self) -> Option<bool> {
        *self.reachable_at_stop.lock().unwrap()
    }
}

#[async_trait]
impl Datasource for RecordingDatasource {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn can_start(&self) -> bool {
        true
    }

    async fn start(&self, _ctx: &mut Context) -> Result<(), DatasourceError> {
        self.events.lock().unwrap().push("start");
        Ok(())
    }

    async fn stop(&self, _ctx: &mut Context) -> Result<(), DatasourceError> {
        self.events.lock().unwrap().push("stop");
        let watched = *self.watched.lock().unwrap();
        if let Some(addr) = watched {
            let reachable = tokio::net::TcpStream::connect(addr).await.is_ok();
            *self.reachable_at_stop.lock().unwrap() = Some(reachable);
        }
        if self.fail_stop {
            return Err(DatasourceError::Disconnect {
                kind: DbKind::Postgres,
                source: "connection reset".into(),
            });
        }
        Ok(())
    }
}
