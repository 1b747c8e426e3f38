//! Hot reload.
//!
//! Watches the quest and item directories and reloads the questbook when a
//! definition file changes. Bursts of filesystem events (an editor saving, a
//! `git checkout`) collapse into a single reload once the directory has been
//! quiet for [`DEBOUNCE`].

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::WatchError;
use crate::loader::walker::is_config_file;
use crate::service::{Questbook, ReloadReport};

pub const DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub enum ReloadEvent {
    Reloaded {
        /// First changed path of the burst
        trigger: PathBuf,
        report: ReloadReport,
    },
    Error(String),
}

/// Whether a filesystem event should cause a reload
pub fn is_reload_trigger(event: &Event) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => event.paths.iter().any(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_config_file)
        }),
        // a removed directory takes its files with it
        EventKind::Remove(_) => !event.paths.is_empty(),
        _ => false,
    }
}

/// Start watching the questbook's data directories. Reload results arrive on
/// the returned channel; dropping the receiver stops the watcher.
pub fn start_file_watcher(
    book: Arc<Questbook>,
) -> Result<mpsc::Receiver<ReloadEvent>, WatchError> {
    let (tx, rx) = mpsc::channel(32);
    let (notify_tx, notify_rx) = std_mpsc::channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            let _ = notify_tx.send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .map_err(WatchError::Create)?;

    let mut watched = Vec::new();
    for dir in [book.quests_dir(), book.items_dir()] {
        if !dir.exists() {
            warn!("Not watching {:?}: directory does not exist", dir);
            continue;
        }
        watcher
            .watch(&dir, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: dir.clone(),
                source,
            })?;
        watched.push(dir);
    }

    info!("Quest hot-reload watcher started for {:?}", watched);

    std::thread::spawn(move || {
        // owned by the thread so it lives as long as the loop
        let _watcher = watcher;

        while let Ok(res) = notify_rx.recv() {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("File watcher error: {}", e);
                    if tx.blocking_send(ReloadEvent::Error(e.to_string())).is_err() {
                        break;
                    }
                    continue;
                }
            };

            if !is_reload_trigger(&event) {
                continue;
            }
            let trigger = event.paths.first().cloned().unwrap_or_default();

            // wait for the burst to settle
            while notify_rx.recv_timeout(DEBOUNCE).is_ok() {}

            info!("Detected change in {:?}, triggering reload", trigger);
            let report = book.reload();
            info!(
                "Hot-reload completed: {} quests, {} items, {} files with problems",
                report.quests,
                report.items,
                report.files_with_problems()
            );

            if tx
                .blocking_send(ReloadEvent::Reloaded { trigger, report })
                .is_err()
            {
                break;
            }
        }

        info!("Quest hot-reload watcher stopped");
    });

    Ok(rx)
}
