//! Store actor
//!
//! Owns the `LauncherStore` on a single task so every mutate-and-save cycle
//! runs to completion before the next command is handled. Inventory scans run
//! on the blocking pool and re-enter the queue as `ScanFinished`.

use launchpad_core::{
    DisplayFolder, Error, LauncherSnapshot, LauncherStore, Mutation, Program, Result,
};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

const NOT_RUNNING: &str = "Store task not running";

enum StoreCommand {
    Bootstrap {
        reply: oneshot::Sender<LauncherSnapshot>,
    },
    Refresh {
        reply: oneshot::Sender<LauncherSnapshot>,
    },
    ScanFinished {
        generation: u64,
        result: Result<Vec<Program>>,
        reply: oneshot::Sender<LauncherSnapshot>,
    },
    Mutate {
        mutation: Mutation,
        reply: oneshot::Sender<bool>,
    },
    SetSearchQuery {
        query: String,
        reply: oneshot::Sender<LauncherSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<LauncherSnapshot>,
    },
    FolderContents {
        folder_id: String,
        reply: oneshot::Sender<Option<DisplayFolder>>,
    },
}

/// Cloneable handle to the store task
#[derive(Clone)]
pub struct StoreHandle {
    cmd_tx: mpsc::Sender<StoreCommand>,
    snapshot_rx: watch::Receiver<LauncherSnapshot>,
}

impl StoreHandle {
    /// Move `store` onto its own task. Must be called inside a tokio runtime.
    pub fn spawn(store: LauncherStore) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(store.snapshot());

        tokio::spawn(store_task(store, cmd_rx, cmd_tx.downgrade(), snapshot_tx));

        Self {
            cmd_tx,
            snapshot_rx,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> std::result::Result<T, &'static str> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(command(reply))
            .await
            .map_err(|_| NOT_RUNNING)?;
        rx.await.map_err(|_| NOT_RUNNING)
    }

    /// Load saved state and wait for the first scan
    pub async fn bootstrap(&self) -> std::result::Result<LauncherSnapshot, &'static str> {
        self.request(|reply| StoreCommand::Bootstrap { reply }).await
    }

    /// Rescan and wait for the reconciled snapshot
    pub async fn refresh(&self) -> std::result::Result<LauncherSnapshot, &'static str> {
        self.request(|reply| StoreCommand::Refresh { reply }).await
    }

    /// Apply a mutation; resolves to whether the layout changed
    pub async fn apply(&self, mutation: Mutation) -> std::result::Result<bool, &'static str> {
        self.request(|reply| StoreCommand::Mutate { mutation, reply })
            .await
    }

    pub async fn set_search_query(
        &self,
        query: impl Into<String>,
    ) -> std::result::Result<LauncherSnapshot, &'static str> {
        let query = query.into();
        self.request(|reply| StoreCommand::SetSearchQuery { query, reply })
            .await
    }

    pub async fn snapshot(&self) -> std::result::Result<LauncherSnapshot, &'static str> {
        self.request(|reply| StoreCommand::Snapshot { reply }).await
    }

    /// A folder with its resolvable programs
    pub async fn folder_contents(
        &self,
        folder_id: impl Into<String>,
    ) -> std::result::Result<Option<DisplayFolder>, &'static str> {
        let folder_id = folder_id.into();
        self.request(|reply| StoreCommand::FolderContents { folder_id, reply })
            .await
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<LauncherSnapshot> {
        self.snapshot_rx.clone()
    }
}

async fn store_task(
    mut store: LauncherStore,
    mut cmd_rx: mpsc::Receiver<StoreCommand>,
    cmd_tx: mpsc::WeakSender<StoreCommand>,
    snapshot_tx: watch::Sender<LauncherSnapshot>,
) {
    let mut scans = ScanGenerations::default();

    while let Some(command) = cmd_rx.recv().await {
        match command {
            StoreCommand::Bootstrap { reply } => {
                if store.begin_bootstrap() {
                    publish(&store, &snapshot_tx);
                    start_scan(&store, &cmd_tx, scans.begin(), reply);
                } else {
                    let _ = reply.send(store.snapshot());
                }
            }
            StoreCommand::Refresh { reply } => {
                start_scan(&store, &cmd_tx, scans.begin(), reply)
            }
            StoreCommand::ScanFinished {
                generation,
                result,
                reply,
            } => {
                if scans.accept(generation) {
                    store.apply_scan(result);
                    let _ = reply.send(publish(&store, &snapshot_tx));
                } else {
                    debug!(generation, "Dropping result of superseded scan");
                    let _ = reply.send(store.snapshot());
                }
            }
            StoreCommand::Mutate { mutation, reply } => {
                debug!(?mutation, "Applying mutation");
                let changed = store.apply(mutation);
                if changed {
                    publish(&store, &snapshot_tx);
                }
                let _ = reply.send(changed);
            }
            StoreCommand::SetSearchQuery { query, reply } => {
                store.set_search_query(query);
                let _ = reply.send(publish(&store, &snapshot_tx));
            }
            StoreCommand::Snapshot { reply } => {
                let _ = reply.send(store.snapshot());
            }
            StoreCommand::FolderContents { folder_id, reply } => {
                let _ = reply.send(store.folder_contents(&folder_id));
            }
        }
    }

    debug!("Store task stopped");
}

/// Orders overlapping scans so an older result never replaces a newer one
#[derive(Debug, Default)]
struct ScanGenerations {
    started: u64,
    applied: u64,
}

impl ScanGenerations {
    fn begin(&mut self) -> u64 {
        self.started += 1;
        self.started
    }

    /// Whether a finished scan is newer than the last applied one
    fn accept(&mut self, generation: u64) -> bool {
        if generation <= self.applied {
            return false;
        }
        self.applied = generation;
        true
    }
}

fn publish(store: &LauncherStore, snapshot_tx: &watch::Sender<LauncherSnapshot>) -> LauncherSnapshot {
    let snapshot = store.snapshot();
    snapshot_tx.send_replace(snapshot.clone());
    snapshot
}

fn start_scan(
    store: &LauncherStore,
    cmd_tx: &mpsc::WeakSender<StoreCommand>,
    generation: u64,
    reply: oneshot::Sender<LauncherSnapshot>,
) {
    let Some(cmd_tx) = cmd_tx.upgrade() else {
        return;
    };
    let inventory = store.inventory();

    tokio::spawn(async move {
        let result = match tokio::task::spawn_blocking(move || inventory.scan()).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Inventory scan task failed");
                Err(Error::Scan(e.to_string()))
            }
        };
        let _ = cmd_tx
            .send(StoreCommand::ScanFinished {
                generation,
                result,
                reply,
            })
            .await;
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use launchpad_core::invariants::check_state;
    use launchpad_core::{DisplayEntry, Entry, MemoryRepository};

    fn program(id: &str, name: &str) -> Program {
        Program::new(id, name, format!("/Applications/{}.app", name))
    }

    fn spawn_with(programs: Arc<Mutex<Vec<Program>>>) -> (StoreHandle, MemoryRepository) {
        let repo = MemoryRepository::new();
        let inventory = move || -> Result<Vec<Program>> { Ok(programs.lock().unwrap().clone()) };
        let store = LauncherStore::new(Arc::new(inventory), Box::new(repo.clone()));
        (StoreHandle::spawn(store), repo)
    }

    fn abc() -> Arc<Mutex<Vec<Program>>> {
        Arc::new(Mutex::new(vec![
            program("a", "Alpha"),
            program("b", "Bravo"),
            program("c", "Charlie"),
        ]))
    }

    #[tokio::test]
    async fn test_bootstrap_scans_once() {
        let (handle, repo) = spawn_with(abc());

        let snapshot = handle.bootstrap().await.unwrap();
        assert_eq!(snapshot.program_count, 3);
        assert_eq!(snapshot.pages[0].len(), 3);
        assert!(snapshot.last_sync.is_some());
        assert!(repo.snapshot().is_some());

        let again = handle.bootstrap().await.unwrap();
        assert_eq!(again.last_sync, snapshot.last_sync);
    }

    #[tokio::test]
    async fn test_mutation_publishes_snapshot() {
        let (handle, _) = spawn_with(abc());
        handle.bootstrap().await.unwrap();
        let mut updates = handle.subscribe();
        let _ = updates.borrow_and_update();

        let changed = handle
            .apply(Mutation::HandleDrop {
                dragged: Entry::app("a"),
                target: Entry::app("b"),
            })
            .await
            .unwrap();

        assert!(changed);
        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow().clone();
        assert!(matches!(snapshot.pages[0][0], DisplayEntry::Folder(_)));
        assert_eq!(snapshot.folders.len(), 1);
    }

    #[tokio::test]
    async fn test_folder_contents_query() {
        let (handle, _) = spawn_with(abc());
        handle.bootstrap().await.unwrap();
        handle
            .apply(Mutation::CreateFolder {
                name: "Pair".into(),
                program_ids: vec!["b".into(), "a".into()],
            })
            .await
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        let folder_id = snapshot.folders[0].id.clone();
        let folder = handle.folder_contents(&folder_id).await.unwrap().unwrap();

        assert_eq!(folder.name, "Pair");
        let ids: Vec<&str> = folder.apps.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(handle.folder_contents("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_mutation_reports_unchanged() {
        let (handle, _) = spawn_with(abc());
        handle.bootstrap().await.unwrap();

        let changed = handle
            .apply(Mutation::DissolveFolder {
                folder_id: "missing".into(),
            })
            .await
            .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_serialized() {
        let (handle, repo) = spawn_with(abc());
        handle.bootstrap().await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..30 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                let ids = ["a", "b", "c"];
                let mutation = match i % 3 {
                    0 => Mutation::CreateFolder {
                        name: format!("Group {}", i),
                        program_ids: vec![ids[i % 3].into(), ids[(i + 1) % 3].into()],
                    },
                    1 => Mutation::EnsureAppOnTopLevel {
                        program_id: ids[i % 3].into(),
                    },
                    _ => Mutation::MoveEntry {
                        dragged: Entry::app(ids[i % 3]),
                        before: Entry::app(ids[(i + 2) % 3]),
                    },
                };
                handle.apply(mutation).await.unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = handle.snapshot().await.unwrap();
        let saved = repo.snapshot().unwrap();
        assert!(check_state(&saved, |id| matches!(id, "a" | "b" | "c")).is_empty());

        let placed: usize = snapshot
            .pages
            .iter()
            .flatten()
            .map(|entry| match entry {
                DisplayEntry::App(_) => 1,
                DisplayEntry::Folder(folder) => folder.apps.len(),
            })
            .sum();
        assert_eq!(placed, 3);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_programs() {
        let programs = abc();
        let (handle, _) = spawn_with(programs.clone());
        handle.bootstrap().await.unwrap();

        programs.lock().unwrap().push(program("d", "Delta"));
        let snapshot = handle.refresh().await.unwrap();

        assert_eq!(snapshot.program_count, 4);
        assert_eq!(snapshot.pages[0].last().unwrap().title(), "Delta");
    }

    #[tokio::test]
    async fn test_search_query_round_trip() {
        let (handle, _) = spawn_with(abc());
        handle.bootstrap().await.unwrap();

        let snapshot = handle.set_search_query("br").await.unwrap();
        assert_eq!(snapshot.search_query, "br");
        assert_eq!(snapshot.search_results.len(), 1);
        assert_eq!(snapshot.search_results[0].id, "b");
    }

    #[tokio::test]
    async fn test_layout_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path().join("applications");
        std::fs::create_dir_all(&apps).unwrap();
        for name in ["alpha", "bravo", "charlie"] {
            std::fs::write(
                apps.join(format!("{}.desktop", name)),
                format!("[Desktop Entry]\nType=Application\nName={}\n", name),
            )
            .unwrap();
        }
        let config = launchpad_core::LauncherConfig::from_toml(&format!(
            "[storage]\nbackend = \"sqlite\"\npath = \"{}\"\n\n[scan]\nroots = [\"{}\"]\nsystem_roots = []\n",
            dir.path().join("state.db").display(),
            apps.display()
        ))
        .unwrap();

        let handle = StoreHandle::spawn(LauncherStore::from_config(&config).unwrap());
        handle.bootstrap().await.unwrap();
        assert!(handle
            .apply(Mutation::HandleDrop {
                dragged: Entry::app("charlie"),
                target: Entry::app("alpha"),
            })
            .await
            .unwrap());
        drop(handle);

        let handle = StoreHandle::spawn(LauncherStore::from_config(&config).unwrap());
        let snapshot = handle.bootstrap().await.unwrap();
        let DisplayEntry::Folder(folder) = &snapshot.pages[0][0] else {
            panic!("expected folder");
        };
        let names: Vec<&str> = folder.apps.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["charlie", "alpha"]);
        assert_eq!(snapshot.pages[0][1].title(), "bravo");
    }

    #[test]
    fn test_scan_generations_reject_older_results() {
        let mut scans = ScanGenerations::default();
        let first = scans.begin();
        let second = scans.begin();

        assert!(scans.accept(second));
        assert!(!scans.accept(first));
        assert!(!scans.accept(second));
        let third = scans.begin();
        assert!(scans.accept(third));
    }

    #[tokio::test]
    async fn test_slow_older_scan_does_not_overwrite_newer_one() {
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let gate = Mutex::new(Some((started_tx, release_rx)));
        let calls = AtomicUsize::new(0);
        let old = abc().lock().unwrap().clone();
        let mut new = old.clone();
        new.push(program("d", "Delta"));

        let inventory = move || -> Result<Vec<Program>> {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(old.clone()),
                1 => {
                    if let Some((started, release)) = gate.lock().unwrap().take() {
                        started.send(()).unwrap();
                        release.recv().unwrap();
                    }
                    Ok(old.clone())
                }
                _ => Ok(new.clone()),
            }
        };
        let store = LauncherStore::new(Arc::new(inventory), Box::new(MemoryRepository::new()));
        let handle = StoreHandle::spawn(store);
        handle.bootstrap().await.unwrap();

        let slow = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.refresh().await.unwrap() })
        };
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();

        let fresh = handle.refresh().await.unwrap();
        assert_eq!(fresh.program_count, 4);

        release_tx.send(()).unwrap();
        let stale = slow.await.unwrap();
        assert_eq!(stale.program_count, 4);
        assert_eq!(handle.snapshot().await.unwrap().program_count, 4);
    }

    #[tokio::test]
    async fn test_scan_failure_is_reported_in_snapshot() {
        let repo = MemoryRepository::new();
        let inventory = || -> Result<Vec<Program>> { Err(Error::Scan("denied".into())) };
        let handle = StoreHandle::spawn(LauncherStore::new(Arc::new(inventory), Box::new(repo)));

        let snapshot = handle.bootstrap().await.unwrap();
        assert!(snapshot.last_error.unwrap().contains("denied"));
        assert_eq!(snapshot.program_count, 0);
    }
}
