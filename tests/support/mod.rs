#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use farewatch::adapter::outbound::resolver::LiteralResolver;
use farewatch::adapter::outbound::sqlite::SqliteStore;
use farewatch::application::alert::AlertPolicy;
use farewatch::application::history::{HistoryService, SameDayPolicy};
use farewatch::application::scheduler::Scheduler;
use farewatch::infrastructure::bootstrap::open_store;
use farewatch::port::PriceFetcher;
use farewatch::testkit::config;
use farewatch::testkit::notifier::RecordingNotifier;
use tempfile::TempDir;

/// SQLite database in a directory that is deleted on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("farewatch.db");
        Self { dir, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Open a fresh store over the same file.
    pub fn open(&self) -> Arc<SqliteStore> {
        Arc::new(open_store(&self.path).expect("open sqlite store"))
    }
}

/// A scheduler over a SQLite store, recording every event it raises.
pub struct Harness {
    pub store: Arc<SqliteStore>,
    pub history: Arc<HistoryService>,
    pub scheduler: Arc<Scheduler>,
    pub notifier: RecordingNotifier,
}

impl Harness {
    pub fn new(db: &TempDb, fetcher: Arc<dyn PriceFetcher>) -> Self {
        let store = db.open();
        let history = Arc::new(HistoryService::new(store.clone(), SameDayPolicy::Lowest));
        let notifier = RecordingNotifier::new();
        let scheduler = Arc::new(Scheduler::new(
            config::scheduler(),
            fetcher,
            Arc::new(LiteralResolver),
            store.clone(),
            history.clone(),
            AlertPolicy::default(),
            Arc::new(notifier.clone()),
        ));
        Self {
            store,
            history,
            scheduler,
            notifier,
        }
    }
}
