//! The `watch` loop: keeps the status current and prints every change.
//!
//! Edits to the events file trigger a full refresh, edits to the
//! preferences file switch the watched calendars. Both files are watched
//! through their parent directories, so editors that save by renaming a
//! temporary file are picked up too.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nextup_server::{
    Change, EventSource, Preferences, StatusUpdate, Ticker, TickerConfig, TickerHandle,
};
use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::Context;
use crate::error::{ClientError, ClientResult};

/// One printed line per update: `Standup in 12 min`, with the next refresh
/// appended in debug runs.
pub fn update_line(update: &StatusUpdate, verbose: bool) -> String {
    if !verbose {
        return update.status.clone();
    }
    let next = match update.interval {
        Some(interval) => format!("next refresh in {}", interval),
        None => "no refresh scheduled".to_string(),
    };
    let change = match update.change {
        Change::Switched => "switched",
        Change::Refreshed => "refreshed",
    };
    format!("{} [{}, {}]", update.status, change, next)
}

/// Run until interrupted.
pub async fn run(ctx: &mut Context, verbose: bool) -> ClientResult<()> {
    let calendars = ctx.watched_calendars()?;
    let config = TickerConfig::default()
        .with_format(ctx.config().display.format_options())
        .with_day_boundary(ctx.boundary());

    let ticker = Ticker::new(config, ctx.source(), calendars);
    let handle = ticker.handle();

    let mut last_status: Option<String> = None;
    let task = tokio::spawn(ticker.run(move |update| {
        // Refreshes that leave the text unchanged are not printed.
        if update.change == Change::Refreshed && last_status.as_ref() == Some(&update.status) {
            return;
        }
        println!("{}", update_line(&update, verbose));
        last_status = Some(update.status);
    }));

    let preferences_file = ctx.preferences().path().to_path_buf();
    let files = WatchedFiles::new(ctx.events_file().map(PathBuf::as_path), &preferences_file);
    let watcher = FileWatcher::start(files)?;
    let forwarder = tokio::spawn(forward_changes(
        watcher,
        handle.clone(),
        preferences_file,
        SelectionReloader {
            source: ctx.source(),
        },
    ));

    tokio::signal::ctrl_c().await?;
    info!("interrupted, stopping");
    forwarder.abort();
    handle
        .stop()
        .await
        .map_err(|_| ClientError::action("refresh loop already stopped"))?;
    task.await
        .map_err(|e| ClientError::action(format!("refresh loop failed: {}", e)))?;
    Ok(())
}

/// Which watched file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileChange {
    Events,
    Preferences,
}

#[derive(Debug, Clone)]
struct WatchedFile {
    dir: PathBuf,
    name: OsString,
}

impl WatchedFile {
    fn new(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Notifications carry resolved paths on some platforms.
        let dir = dir.canonicalize().unwrap_or(dir);
        Some(Self { dir, name })
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name() == Some(self.name.as_os_str())
            && path.parent() == Some(self.dir.as_path())
    }
}

/// The events file (when events come from a file) and the preferences file.
#[derive(Debug, Clone)]
struct WatchedFiles {
    events: Option<WatchedFile>,
    preferences: Option<WatchedFile>,
}

impl WatchedFiles {
    fn new(events: Option<&Path>, preferences: &Path) -> Self {
        Self {
            events: events.and_then(WatchedFile::new),
            preferences: WatchedFile::new(preferences),
        }
    }

    /// Parent directories to watch, without duplicates.
    fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for file in self.events.iter().chain(self.preferences.iter()) {
            if !dirs.contains(&file.dir) {
                dirs.push(file.dir.clone());
            }
        }
        dirs
    }

    /// Maps a notification to the file it concerns. Reads and metadata-only
    /// changes are ignored.
    fn classify(&self, event: &Event) -> Option<FileChange> {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            EventKind::Modify(ModifyKind::Metadata(_)) => return None,
            EventKind::Modify(_) => {}
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => {}
            _ => return None,
        }

        let hit = |file: &Option<WatchedFile>| {
            file.as_ref()
                .is_some_and(|f| event.paths.iter().any(|p| f.matches(p)))
        };
        if hit(&self.preferences) {
            Some(FileChange::Preferences)
        } else if hit(&self.events) {
            Some(FileChange::Events)
        } else {
            None
        }
    }
}

/// Turns filesystem notifications into [`FileChange`]s. Watching stops
/// when this is dropped.
struct FileWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::Receiver<FileChange>,
}

impl FileWatcher {
    fn start(files: WatchedFiles) -> ClientResult<Self> {
        let (tx, changes) = mpsc::channel(64);
        let dirs = files.directories();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if let Some(change) = files.classify(&event) {
                        debug!(?change, paths = ?event.paths, "watched file changed");
                        if tx.blocking_send(change).is_err() {
                            debug!("watch loop gone, dropping change");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "file watch error"),
            }
        })?;

        for dir in dirs {
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "not watching missing directory");
                continue;
            }
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            debug!(dir = %dir.display(), "watching");
        }

        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }
}

/// Sends a refresh for events file changes and the reloaded selection for
/// preferences changes. Changes queued together are handled once.
async fn forward_changes(
    mut watcher: FileWatcher,
    handle: TickerHandle,
    preferences_file: PathBuf,
    reloader: SelectionReloader,
) {
    while let Some(first) = watcher.changes.recv().await {
        let mut pending = vec![first];
        while let Ok(change) = watcher.changes.try_recv() {
            if !pending.contains(&change) {
                pending.push(change);
            }
        }

        for change in pending {
            let sent = match change {
                FileChange::Preferences => match reloader.selected_calendars(&preferences_file) {
                    Ok(ids) => {
                        info!(calendars = ?ids, "preferences changed");
                        handle.set_calendars(ids).await
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to reload preferences");
                        continue;
                    }
                },
                FileChange::Events => {
                    debug!("events file changed");
                    handle.refresh().await
                }
            };
            if sent.is_err() {
                return;
            }
        }
    }
}

/// Resolves the calendar selection again after the preferences file changed.
struct SelectionReloader {
    source: Arc<dyn EventSource>,
}

impl SelectionReloader {
    fn selected_calendars(&self, preferences_file: &Path) -> ClientResult<Vec<String>> {
        let preferences = Preferences::load(preferences_file)?;
        let calendars = self.source.calendars()?;
        let default_id = self.source.default_calendar_id()?;
        Ok(preferences.resolve(&calendars, default_id.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nextup_core::PollInterval;

    fn update(change: Change, interval: Option<u64>) -> StatusUpdate {
        StatusUpdate {
            change,
            status: "Standup in 12 min".to_string(),
            interval: interval.map(PollInterval::from_secs),
            menu: None,
            at: Utc.with_ymd_and_hms(2025, 2, 5, 9, 48, 0).unwrap(),
        }
    }

    #[test]
    fn plain_lines() {
        assert_eq!(
            update_line(&update(Change::Switched, Some(60)), false),
            "Standup in 12 min"
        );
    }

    #[test]
    fn verbose_lines() {
        assert_eq!(
            update_line(&update(Change::Refreshed, Some(60)), true),
            "Standup in 12 min [refreshed, next refresh in 60s]"
        );
        assert_eq!(
            update_line(&update(Change::Switched, None), true),
            "Standup in 12 min [switched, no refresh scheduled]"
        );
    }

    #[test]
    fn reloads_selection_from_preferences() {
        let (dir, ctx) = crate::commands::testing::context();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "selected_calendars = [\"home\"]\n").unwrap();

        let reloader = SelectionReloader {
            source: ctx.source(),
        };
        assert_eq!(reloader.selected_calendars(&path).unwrap(), vec!["home"]);
    }

    /// Rewrites `path` with `content` and puts the old modification time back.
    fn rewrite_keeping_mtime(path: &Path, content: &str) {
        let mtime = std::fs::metadata(path).unwrap().modified().unwrap();
        std::fs::write(path, content).unwrap();
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        assert_eq!(std::fs::metadata(path).unwrap().modified().unwrap(), mtime);
    }

    mod classify {
        use super::*;
        use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

        fn files() -> (tempfile::TempDir, PathBuf, WatchedFiles) {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().canonicalize().unwrap();
            let files = WatchedFiles::new(
                Some(&dir.path().join("events.json")),
                &dir.path().join("preferences.toml"),
            );
            (dir, root, files)
        }

        fn event(kind: EventKind, path: PathBuf) -> Event {
            Event::new(kind).add_path(path)
        }

        fn write() -> EventKind {
            EventKind::Modify(ModifyKind::Data(DataChange::Content))
        }

        #[test]
        fn by_path() {
            let (_dir, root, files) = files();

            assert_eq!(
                files.classify(&event(write(), root.join("events.json"))),
                Some(FileChange::Events)
            );
            assert_eq!(
                files.classify(&event(
                    EventKind::Create(CreateKind::File),
                    root.join("preferences.toml")
                )),
                Some(FileChange::Preferences)
            );
            assert_eq!(
                files.classify(&event(
                    EventKind::Remove(RemoveKind::File),
                    root.join("events.json")
                )),
                Some(FileChange::Events)
            );
            assert_eq!(files.classify(&event(write(), root.join("notes.txt"))), None);
        }

        #[test]
        fn rename_onto_the_file_counts() {
            let (_dir, root, files) = files();
            let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
                .add_path(root.join(".events.json.swp"))
                .add_path(root.join("events.json"));
            assert_eq!(files.classify(&rename), Some(FileChange::Events));
        }

        #[test]
        fn reads_and_metadata_are_ignored() {
            let (_dir, root, files) = files();
            let path = root.join("events.json");
            assert_eq!(
                files.classify(&event(EventKind::Access(AccessKind::Read), path.clone())),
                None
            );
            assert_eq!(
                files.classify(&event(
                    EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
                    path.clone()
                )),
                None
            );
            assert_eq!(
                files.classify(&event(
                    EventKind::Access(AccessKind::Close(AccessMode::Write)),
                    path
                )),
                Some(FileChange::Events)
            );
        }

        #[test]
        fn shared_directory_is_watched_once() {
            let (_dir, root, files) = files();
            assert_eq!(files.directories(), vec![root]);

            let only_preferences = WatchedFiles::new(None, Path::new("preferences.toml"));
            assert!(only_preferences.events.is_none());
            assert_eq!(only_preferences.directories().len(), 1);
        }
    }

    mod watcher {
        use super::*;
        use std::time::Duration;

        use chrono::{DateTime, FixedOffset};
        use nextup_server::{Clock, DayBoundary, JsonFileSource};

        use crate::commands::testing::{at, event_file, timed};

        const WAIT: Duration = Duration::from_secs(5);

        struct FixedClock(DateTime<Utc>);

        impl Clock for FixedClock {
            fn now(&self) -> DateTime<Utc> {
                self.0
            }
        }

        /// Reads statuses until `expected` shows up.
        async fn wait_for(updates: &mut mpsc::UnboundedReceiver<String>, expected: &str) {
            let seen = tokio::time::timeout(WAIT, async {
                while let Some(status) = updates.recv().await {
                    if status == expected {
                        return true;
                    }
                }
                false
            })
            .await;
            assert!(matches!(seen, Ok(true)), "never saw {:?}", expected);
        }

        #[tokio::test]
        async fn content_change_with_same_mtime_is_noticed() {
            let dir = tempfile::tempdir().unwrap();
            let events = dir.path().join("events.json");
            std::fs::write(&events, "{}").unwrap();

            let files = WatchedFiles::new(Some(&events), &dir.path().join("preferences.toml"));
            let mut watcher = FileWatcher::start(files).unwrap();

            rewrite_keeping_mtime(&events, r#"{"calendars": []}"#);

            let change = tokio::time::timeout(WAIT, watcher.changes.recv())
                .await
                .expect("no notification for the rewrite");
            assert_eq!(change, Some(FileChange::Events));
        }

        #[tokio::test]
        async fn file_edits_reach_the_ticker() {
            let dir = tempfile::tempdir().unwrap();
            let events = dir.path().join("events.json");
            let preferences = dir.path().join("preferences.toml");
            std::fs::write(&events, serde_json::to_string(&event_file()).unwrap()).unwrap();

            let source: Arc<dyn EventSource> = Arc::new(JsonFileSource::new(&events));
            let config = TickerConfig::default()
                .with_day_boundary(DayBoundary::Fixed(FixedOffset::east_opt(0).unwrap()));
            let ticker = Ticker::new(config, source.clone(), vec!["work".to_string()])
                .with_clock(Arc::new(FixedClock(at(9, 48))));
            let handle = ticker.handle();
            let (tx, mut updates) = mpsc::unbounded_channel();
            let task = tokio::spawn(ticker.run(move |update| {
                let _ = tx.send(update.status);
            }));

            wait_for(&mut updates, "Standup in 12 min").await;

            let watcher =
                FileWatcher::start(WatchedFiles::new(Some(&events), &preferences)).unwrap();
            let forwarder = tokio::spawn(forward_changes(
                watcher,
                handle.clone(),
                preferences.clone(),
                SelectionReloader { source },
            ));

            let mut renamed = event_file();
            renamed.events[0] = timed("Retro", "work", at(10, 0));
            rewrite_keeping_mtime(&events, &serde_json::to_string(&renamed).unwrap());
            wait_for(&mut updates, "Retro in 12 min").await;

            std::fs::write(&preferences, "selected_calendars = [\"home\"]\n").unwrap();
            wait_for(&mut updates, "Dentist in 1 hour (Main St 1)").await;

            forwarder.abort();
            handle.stop().await.unwrap();
            task.await.unwrap();
        }
    }
}
