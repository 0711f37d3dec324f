//! Centralized bookmark list with serialized asynchronous load/save.
//!
//! The in-memory list is authoritative; every mutation notifies observers
//! immediately and enqueues a save. All disk traffic flows through a FIFO of
//! pending operation tags (`Load` / `Save`) processed strictly one at a time,
//! so bursts of edits and reloads never interleave their I/O. A file watch on
//! the backing file picks up external edits; it is detached while our own
//! saves write the file.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use crate::config::WatchSettings;
use crate::events::{Signal, Subscription};
use crate::tasks::RunnerHandle;

use super::bookmark::Bookmark;
use super::store::{BookmarkStore, StoreError, StoreResult};

/// Tag of one pending I/O operation. No payload travels with the tag: loads
/// always target the backing file, and saves snapshot the in-memory list at
/// dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Load,
    Save,
}

/// What to do with a watch event that touched the bookmarks file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateDecision {
    /// Outside the coalescing window: reload now.
    Reload,
    /// Inside the window, nothing deferred yet: reload once it closes.
    Defer(Duration),
    /// Inside the window, a trailing reload is already scheduled.
    Coalesced,
}

struct GateState {
    last_reload: Option<Instant>,
    deferred: bool,
}

/// Coalesces watch events to at most one reload per window.
///
/// Events landing inside the window are never dropped outright: the first
/// one defers a trailing reload to the end of the window, so the file's
/// final contents are always picked up.
struct ReloadGate {
    window: Duration,
    state: Mutex<GateState>,
}

impl ReloadGate {
    fn new(window: Duration) -> Self {
        Self {
            window,
            state: Mutex::new(GateState {
                last_reload: None,
                deferred: false,
            }),
        }
    }

    fn on_event(&self, now: Instant) -> GateDecision {
        let mut state = self.state.lock();
        match state.last_reload {
            Some(prev) if now.duration_since(prev) < self.window => {
                if state.deferred {
                    GateDecision::Coalesced
                } else {
                    state.deferred = true;
                    GateDecision::Defer(self.window - now.duration_since(prev))
                }
            }
            _ => {
                state.last_reload = Some(now);
                GateDecision::Reload
            }
        }
    }

    /// The deferred trailing reload is running; open a fresh window.
    fn deferred_fired(&self, now: Instant) {
        let mut state = self.state.lock();
        state.deferred = false;
        state.last_reload = Some(now);
    }
}

/// Whether a watch event is a create or modify touching the bookmarks file.
fn watch_event_matches(event: &Event, file_name: Option<&OsStr>) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    event.paths.iter().any(|p| p.file_name() == file_name)
}

struct ListState {
    bookmarks: Vec<Bookmark>,
    pending: VecDeque<PendingOp>,
    watcher: Option<RecommendedWatcher>,
}

struct ListInner {
    store: BookmarkStore,
    runner: RunnerHandle,
    watch: WatchSettings,
    state: Mutex<ListState>,
    changed: Signal<()>,
    reload_gate: ReloadGate,
    weak: Weak<ListInner>,
}

/// Shared handle to the ordered, persistent bookmark list.
///
/// Clones share one list. Mutating calls never block and never return
/// errors; I/O failures surface only in the logs, per the original contract.
#[derive(Clone)]
pub struct BookmarkList {
    inner: Arc<ListInner>,
}

impl BookmarkList {
    /// Create a list backed by `store`, immediately scheduling the initial
    /// load and arming the file watch.
    pub fn new(store: BookmarkStore, runner: RunnerHandle) -> Self {
        Self::with_watch(store, runner, WatchSettings::default())
    }

    /// Create a list with explicit watch settings.
    pub fn with_watch(store: BookmarkStore, runner: RunnerHandle, watch: WatchSettings) -> Self {
        let window = Duration::from_millis(watch.debounce_ms);
        let inner = Arc::new_cyclic(|weak| ListInner {
            store,
            runner,
            watch,
            state: Mutex::new(ListState {
                bookmarks: Vec::new(),
                pending: VecDeque::new(),
                watcher: None,
            }),
            changed: Signal::new(),
            reload_gate: ReloadGate::new(window),
            weak: weak.clone(),
        });

        inner.enqueue(PendingOp::Load);
        inner.arm_watcher();

        Self { inner }
    }

    /// Observe list changes. Fires on every mutation (before the save lands)
    /// and again after every load completes; consumers must treat it as
    /// at-least-once.
    pub fn on_changed(&self, handler: impl Fn(&()) + Send + Sync + 'static) -> Subscription {
        self.inner.changed.connect(handler)
    }

    /// Append a copy of `bookmark` to the end of the list.
    pub fn append(&self, bookmark: &Bookmark) {
        self.inner.state.lock().bookmarks.push(bookmark.clone());
        self.inner.save();
    }

    /// Insert a copy of `bookmark` at `index`.
    pub fn insert_at(&self, bookmark: &Bookmark, index: usize) {
        {
            let mut state = self.inner.state.lock();
            if index > state.bookmarks.len() {
                tracing::warn!(index, len = state.bookmarks.len(), "insert_at out of range");
                return;
            }
            state.bookmarks.insert(index, bookmark.clone());
        }
        self.inner.save();
    }

    /// Delete the bookmark at `index`.
    pub fn delete_at(&self, index: usize) {
        {
            let mut state = self.inner.state.lock();
            if index >= state.bookmarks.len() {
                tracing::warn!(index, len = state.bookmarks.len(), "delete_at out of range");
                return;
            }
            state.bookmarks.remove(index);
        }
        self.inner.save();
    }

    /// Delete every bookmark matching `uri`. Saves only if something was
    /// actually removed.
    pub fn delete_all_with_uri(&self, uri: &str) {
        let removed = {
            let mut state = self.inner.state.lock();
            let before = state.bookmarks.len();
            state.bookmarks.retain(|b| b.uri() != uri);
            state.bookmarks.len() != before
        };
        if removed {
            self.inner.save();
        }
    }

    /// Move the bookmark at `from` to `destination`.
    ///
    /// No-op when the indices are equal. A forward move inserts at
    /// `destination - 1` (removal shifted everything left); a backward move
    /// inserts at `destination` directly.
    pub fn move_item(&self, from: usize, destination: usize) {
        if from == destination {
            return;
        }
        {
            let mut state = self.inner.state.lock();
            if from >= state.bookmarks.len() || destination > state.bookmarks.len() {
                tracing::warn!(
                    from,
                    destination,
                    len = state.bookmarks.len(),
                    "move_item out of range"
                );
                return;
            }
            let bookmark = state.bookmarks.remove(from);
            let target = if from < destination {
                destination - 1
            } else {
                destination
            };
            state.bookmarks.insert(target, bookmark);
        }
        self.inner.save();
    }

    /// Set or clear the custom label of the bookmark at `index`.
    ///
    /// A content change: observers are notified and the list is re-saved.
    pub fn set_label_at(&self, index: usize, label: Option<String>) {
        {
            let mut state = self.inner.state.lock();
            let Some(bookmark) = state.bookmarks.get_mut(index) else {
                tracing::warn!(index, "set_label_at out of range");
                return;
            };
            bookmark.set_label(label);
        }
        self.inner.save();
    }

    /// Set the icon of the bookmark at `index`.
    ///
    /// Display-only: observers are notified but nothing is written, since
    /// icons do not appear in the bookmarks file.
    pub fn set_icon_at(&self, index: usize, icon: Option<String>) {
        {
            let mut state = self.inner.state.lock();
            let Some(bookmark) = state.bookmarks.get_mut(index) else {
                tracing::warn!(index, "set_icon_at out of range");
                return;
            };
            bookmark.set_icon(icon);
        }
        self.inner.changed.emit(&());
    }

    /// Whether a bookmark with the same URI is in the list.
    pub fn contains(&self, bookmark: &Bookmark) -> bool {
        self.inner
            .state
            .lock()
            .bookmarks
            .iter()
            .any(|b| b.same_uri(bookmark))
    }

    /// Position of the first bookmark with `uri`.
    pub fn index_of(&self, uri: &str) -> Option<usize> {
        self.inner
            .state
            .lock()
            .bookmarks
            .iter()
            .position(|b| b.uri() == uri)
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().bookmarks.is_empty()
    }

    /// Copy of the bookmark at `index`.
    pub fn item_at(&self, index: usize) -> Option<Bookmark> {
        self.inner.state.lock().bookmarks.get(index).cloned()
    }

    /// Snapshot of the whole list in order.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.inner.state.lock().bookmarks.clone()
    }

    /// Schedule a reload from disk, replacing the in-memory list.
    pub fn reload(&self) {
        self.inner.load();
    }

    #[cfg(test)]
    pub(crate) fn pending_ops(&self) -> usize {
        self.inner.state.lock().pending.len()
    }
}

impl ListInner {
    /// Mutation epilogue: optimistic change notification, then queue a save.
    fn save(&self) {
        self.changed.emit(&());
        self.enqueue(PendingOp::Save);
    }

    fn load(&self) {
        self.enqueue(PendingOp::Load);
    }

    /// Push an operation tag; if it is the only pending operation, nothing
    /// is in flight and processing starts now. Otherwise it waits its turn.
    fn enqueue(&self, op: PendingOp) {
        let start = {
            let mut state = self.state.lock();
            state.pending.push_back(op);
            state.pending.len() == 1
        };
        if start {
            self.process_front();
        }
    }

    /// An in-flight operation completed: pop its tag and dispatch the next.
    fn op_finished(&self) {
        let more = {
            let mut state = self.state.lock();
            state.pending.pop_front();
            !state.pending.is_empty()
        };
        if more {
            self.process_front();
        }
    }

    fn process_front(&self) {
        let front = self.state.lock().pending.front().copied();
        match front {
            Some(PendingOp::Load) => self.begin_load(),
            Some(PendingOp::Save) => self.begin_save(),
            None => {}
        }
    }

    /// Dispatch a load: wipe the old list now, read on the worker, parse on
    /// completion. The changed signal fires whether or not the read worked.
    fn begin_load(&self) {
        self.state.lock().bookmarks.clear();

        let weak = self.weak.clone();
        let store = self.store.clone();
        self.runner.spawn(Box::new(move || {
            let result = store.read();
            if let Some(inner) = weak.upgrade() {
                inner.finish_load(result);
            }
        }));
    }

    fn finish_load(&self, result: StoreResult<String>) {
        match result {
            Ok(contents) => {
                let bookmarks = BookmarkStore::parse(&contents);
                self.state.lock().bookmarks = bookmarks;
            }
            // Fresh profile: no bookmarks file anywhere yet.
            Err(StoreError::NotFound) => {}
            Err(e) => {
                tracing::warn!("could not load bookmarks file: {e}");
            }
        }
        self.changed.emit(&());
        // The watch may not have come up at construction (parent dir absent
        // until something creates it); every completed load retries.
        self.arm_watcher();
        self.op_finished();
    }

    /// Dispatch a save: detach the watch so our own write does not trigger a
    /// reload, snapshot the current list, write on the worker, then re-arm.
    fn begin_save(&self) {
        let (contents, old_watcher) = {
            let mut state = self.state.lock();
            (BookmarkStore::render(&state.bookmarks), state.watcher.take())
        };
        // Dropped outside the state lock; tearing down the watcher may wait
        // on its event thread, which takes the same lock.
        drop(old_watcher);

        let weak = self.weak.clone();
        let store = self.store.clone();
        self.runner.spawn(Box::new(move || {
            if let Err(e) = store.write(&contents) {
                tracing::warn!("unable to write bookmarks file: {e}");
            }
            if let Some(inner) = weak.upgrade() {
                inner.arm_watcher();
                inner.op_finished();
            }
        }));
    }

    /// Watch the backing file's directory for external edits. Create and
    /// modify events on the bookmarks file, coalesced within the debounce
    /// window, trigger a reload. No-op while a watch is already armed.
    fn arm_watcher(&self) {
        if !self.watch.enabled {
            return;
        }
        if self.state.lock().watcher.is_some() {
            return;
        }

        let Some(dir) = self.store.primary_path().parent().map(|p| p.to_path_buf()) else {
            return;
        };

        let weak = self.weak.clone();
        let file_name = self.store.primary_path().file_name().map(|n| n.to_owned());

        let handler = move |event: Result<Event, notify::Error>| {
            let Ok(event) = event else { return };
            if !watch_event_matches(&event, file_name.as_deref()) {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.watch_hit();
            }
        };

        let mut watcher = match notify::recommended_watcher(handler) {
            Ok(watcher) => watcher,
            Err(e) => {
                tracing::warn!("could not create bookmarks file watcher: {e}");
                return;
            }
        };

        if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            // Parent dir may not exist before the first save; the save and
            // load completion paths retry.
            tracing::debug!("not watching bookmarks dir yet: {e}");
            return;
        }

        self.state.lock().watcher = Some(watcher);
    }

    /// A relevant watch event fired. Reload immediately when outside the
    /// coalescing window; otherwise make sure one trailing reload runs when
    /// the window closes.
    fn watch_hit(&self) {
        match self.reload_gate.on_event(Instant::now()) {
            GateDecision::Reload => self.load(),
            GateDecision::Defer(delay) => {
                let weak = self.weak.clone();
                self.runner.spawn(Box::new(move || {
                    std::thread::sleep(delay);
                    if let Some(inner) = weak.upgrade() {
                        inner.reload_gate.deferred_fired(Instant::now());
                        inner.load();
                    }
                }));
            }
            GateDecision::Coalesced => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::DeferredRunner;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> BookmarkStore {
        BookmarkStore::new(
            dir.join("gtk-3.0").join("bookmarks"),
            dir.join(".gtk-bookmarks"),
        )
    }

    fn new_list(dir: &Path) -> (BookmarkList, Arc<DeferredRunner>) {
        let runner = DeferredRunner::new();
        let list = BookmarkList::with_watch(
            store_in(dir),
            runner.clone(),
            WatchSettings::disabled(),
        );
        (list, runner)
    }

    /// List with the initial load already completed.
    fn loaded_list(dir: &Path) -> (BookmarkList, Arc<DeferredRunner>) {
        let (list, runner) = new_list(dir);
        runner.run_all();
        (list, runner)
    }

    fn count_changes(list: &BookmarkList) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        let sub = list.on_changed(move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn construction_schedules_initial_load() {
        let dir = tempdir().unwrap();
        let (list, runner) = new_list(dir.path());

        assert_eq!(list.pending_ops(), 1);

        let (changes, _sub) = count_changes(&list);
        runner.run_all();

        // Missing file on both paths is not an error; the list is empty and
        // changed still fired after the load.
        assert!(list.is_empty());
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(list.pending_ops(), 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());

        list.append(&Bookmark::new("file:///a"));
        list.append(&Bookmark::with_label("file:///b", "My B"));
        runner.run_all();

        let on_disk = fs::read_to_string(store_in(dir.path()).primary_path()).unwrap();
        assert_eq!(on_disk, "file:///a\nfile:///b My B\n");

        // A second list over the same store reconstructs both bookmarks.
        let (other, other_runner) = loaded_list(dir.path());
        drop(other_runner);
        let bookmarks = other.bookmarks();
        assert_eq!(bookmarks.len(), 2);
        assert_eq!(bookmarks[0].uri(), "file:///a");
        assert_eq!(bookmarks[0].label(), None);
        assert_eq!(bookmarks[1].uri(), "file:///b");
        assert_eq!(bookmarks[1].label(), Some("My B"));
    }

    #[test]
    fn burst_of_ops_completes_in_fifo_order_without_overlap() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        let store = store_in(dir.path());

        // Save(A) dispatches immediately and snapshots [a].
        list.append(&Bookmark::new("file:///a"));
        assert_eq!(runner.pending(), 1);

        // Save(B) and a reload queue behind the in-flight save.
        list.append(&Bookmark::new("file:///b"));
        list.reload();
        assert_eq!(list.pending_ops(), 3);
        assert_eq!(runner.pending(), 1); // only one op in flight

        // First save lands with its snapshot only.
        runner.run_next();
        assert_eq!(fs::read_to_string(store.primary_path()).unwrap(), "file:///a\n");
        assert_eq!(runner.pending(), 1);

        // Second save snapshots the list as of its dispatch.
        runner.run_next();
        assert_eq!(
            fs::read_to_string(store.primary_path()).unwrap(),
            "file:///a\nfile:///b\n"
        );

        // The reload runs last and replaces the list from disk.
        runner.run_all();
        assert_eq!(list.len(), 2);
        assert_eq!(list.pending_ops(), 0);
    }

    #[test]
    fn load_replaces_rather_than_merges() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());

        list.append(&Bookmark::new("file:///stale"));
        runner.run_all();

        // Another process rewrites the file.
        store_in(dir.path()).write("file:///fresh\n").unwrap();
        list.reload();
        runner.run_all();

        assert_eq!(list.len(), 1);
        assert_eq!(list.item_at(0).unwrap().uri(), "file:///fresh");
    }

    #[test]
    fn legacy_fallback_on_initial_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gtk-bookmarks"), "file:///legacy\n").unwrap();

        let (list, _runner) = loaded_list(dir.path());
        assert_eq!(list.len(), 1);
        assert_eq!(list.item_at(0).unwrap().uri(), "file:///legacy");
    }

    #[test]
    fn move_forward_inserts_before_destination() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        for uri in ["file:///x", "file:///y", "file:///z"] {
            list.append(&Bookmark::new(uri));
        }
        runner.run_all();

        list.move_item(0, 2);
        let uris: Vec<String> = list.bookmarks().iter().map(|b| b.uri().to_string()).collect();
        assert_eq!(uris, ["file:///y", "file:///x", "file:///z"]);
    }

    #[test]
    fn move_backward_inserts_at_destination() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        for uri in ["file:///x", "file:///y", "file:///z"] {
            list.append(&Bookmark::new(uri));
        }
        runner.run_all();

        list.move_item(2, 0);
        let uris: Vec<String> = list.bookmarks().iter().map(|b| b.uri().to_string()).collect();
        assert_eq!(uris, ["file:///z", "file:///x", "file:///y"]);
    }

    #[test]
    fn noop_move_saves_and_notifies_nothing() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        list.append(&Bookmark::new("file:///a"));
        runner.run_all();

        let (changes, _sub) = count_changes(&list);
        list.move_item(0, 0);

        assert_eq!(changes.load(Ordering::SeqCst), 0);
        assert_eq!(list.pending_ops(), 0);
    }

    #[test]
    fn delete_all_with_uri_saves_only_on_removal() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        list.append(&Bookmark::new("file:///a"));
        list.append(&Bookmark::with_label("file:///a", "Again"));
        list.append(&Bookmark::new("file:///b"));
        runner.run_all();

        list.delete_all_with_uri("file:///a");
        assert_eq!(list.len(), 1);
        assert_eq!(list.pending_ops(), 1);
        runner.run_all();

        // No match: nothing removed, nothing queued.
        list.delete_all_with_uri("file:///absent");
        assert_eq!(list.pending_ops(), 0);
    }

    #[test]
    fn insert_and_delete_at() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        list.append(&Bookmark::new("file:///a"));
        list.append(&Bookmark::new("file:///c"));
        runner.run_all();

        list.insert_at(&Bookmark::new("file:///b"), 1);
        assert_eq!(list.index_of("file:///b"), Some(1));

        list.delete_at(0);
        assert_eq!(list.item_at(0).unwrap().uri(), "file:///b");

        // Out of range is logged and ignored, never clamped.
        list.delete_at(99);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn label_change_saves_but_icon_change_does_not() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        list.append(&Bookmark::new("file:///a"));
        runner.run_all();

        let (changes, _sub) = count_changes(&list);

        list.set_icon_at(0, Some("folder-music".to_string()));
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(list.pending_ops(), 0);

        list.set_label_at(0, Some("Tunes".to_string()));
        assert_eq!(changes.load(Ordering::SeqCst), 2);
        assert_eq!(list.pending_ops(), 1);
        runner.run_all();

        let on_disk = fs::read_to_string(store_in(dir.path()).primary_path()).unwrap();
        assert_eq!(on_disk, "file:///a Tunes\n");
    }

    #[test]
    fn contains_matches_by_uri() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());
        list.append(&Bookmark::with_label("file:///a", "A"));
        runner.run_all();

        assert!(list.contains(&Bookmark::new("file:///a")));
        assert!(!list.contains(&Bookmark::new("file:///b")));
    }

    #[test]
    fn mutation_notifies_before_save_completes() {
        let dir = tempdir().unwrap();
        let (list, runner) = loaded_list(dir.path());

        let (changes, _sub) = count_changes(&list);
        list.append(&Bookmark::new("file:///a"));

        // Optimistic: the save has not run yet.
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(runner.pending(), 1);
    }

    #[test]
    fn watch_filter_accepts_create_and_modify_of_the_bookmarks_file() {
        use notify::event::{CreateKind, DataChange, ModifyKind};

        let name = OsStr::new("bookmarks");
        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cfg/gtk-3.0/bookmarks"));
        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/cfg/gtk-3.0/bookmarks"));

        assert!(watch_event_matches(&create, Some(name)));
        assert!(watch_event_matches(&modify, Some(name)));
    }

    #[test]
    fn watch_filter_ignores_other_files_and_event_kinds() {
        use notify::event::{CreateKind, RemoveKind};

        let name = OsStr::new("bookmarks");
        let other_file = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cfg/gtk-3.0/settings.ini"));
        let remove = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/cfg/gtk-3.0/bookmarks"));

        assert!(!watch_event_matches(&other_file, Some(name)));
        assert!(!watch_event_matches(&remove, Some(name)));
    }

    #[test]
    fn reload_gate_defers_inside_the_window_and_reopens_after() {
        let gate = ReloadGate::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert_eq!(gate.on_event(t0), GateDecision::Reload);
        assert_eq!(
            gate.on_event(t0 + Duration::from_millis(100)),
            GateDecision::Defer(Duration::from_millis(900))
        );
        // Further events ride on the already-scheduled trailing reload.
        assert_eq!(
            gate.on_event(t0 + Duration::from_millis(200)),
            GateDecision::Coalesced
        );

        gate.deferred_fired(t0 + Duration::from_millis(1000));
        assert_eq!(
            gate.on_event(t0 + Duration::from_millis(1100)),
            GateDecision::Defer(Duration::from_millis(900))
        );
        assert_eq!(
            gate.on_event(t0 + Duration::from_millis(2500)),
            GateDecision::Reload
        );
    }

    #[test]
    fn edits_inside_window_still_reach_the_list() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let runner = DeferredRunner::new();
        let list = BookmarkList::with_watch(
            store.clone(),
            runner.clone(),
            WatchSettings {
                enabled: false,
                debounce_ms: 500,
            },
        );
        runner.run_all(); // initial load

        store.write("file:///first\n").unwrap();
        list.inner.watch_hit();
        runner.run_next();
        assert_eq!(list.item_at(0).unwrap().uri(), "file:///first");

        // Two more edits land inside the window. One trailing reload is
        // scheduled, and it reads the file's final contents.
        store.write("file:///second\n").unwrap();
        list.inner.watch_hit();
        list.inner.watch_hit();
        assert_eq!(runner.pending(), 1);

        let (changes, _sub) = count_changes(&list);
        runner.run_all();
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.item_at(0).unwrap().uri(), "file:///second");
    }

    #[test]
    fn load_completion_arms_watch_once_directory_exists() {
        let dir = tempdir().unwrap();
        let store = BookmarkStore::new(
            dir.path().join("missing").join("bookmarks"),
            dir.path().join(".gtk-bookmarks"),
        );
        let runner = DeferredRunner::new();
        let list = BookmarkList::with_watch(store, runner.clone(), WatchSettings::default());

        // Parent dir absent at construction: nothing to watch yet.
        assert!(list.inner.state.lock().watcher.is_none());

        fs::create_dir_all(dir.path().join("missing")).unwrap();
        runner.run_all(); // initial load completes and retries the arm
        assert!(list.inner.state.lock().watcher.is_some());
    }
}
