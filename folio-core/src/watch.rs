//! Filesystem change classification and debouncing for live reload.
//!
//! Adding or removing content files changes the set of routes and forces a
//! full reload. Editing an existing file only needs its record refreshed.
//! Bursts of events (an editor save, a `git checkout`) are coalesced into one
//! regeneration.

use crate::filename::is_content_file;
use notify::event::{ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const DEBOUNCE_MS: u64 = 200;

/// How a filesystem change affects the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// An existing file's bytes changed.
    Content,
    /// Files were added, removed or renamed.
    Structural,
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

fn is_content_path(path: &Path) -> bool {
    !is_temp_file(path)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_content_file)
}

/// Decide whether a watcher event matters, and how much.
pub fn classify(event: &Event) -> Option<ChangeKind> {
    let touches_content = event.paths.iter().any(|p| is_content_path(p));

    match &event.kind {
        EventKind::Create(_) if touches_content => Some(ChangeKind::Structural),
        EventKind::Create(_) => event
            .paths
            .iter()
            .any(|p| !is_temp_file(p) && p.is_dir())
            .then_some(ChangeKind::Structural),
        // A removed directory may have held content files.
        EventKind::Remove(RemoveKind::Folder) => Some(ChangeKind::Structural),
        EventKind::Remove(_) if touches_content => Some(ChangeKind::Structural),
        EventKind::Modify(ModifyKind::Name(_)) if touches_content => Some(ChangeKind::Structural),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) if touches_content => {
            Some(ChangeKind::Content)
        }
        _ => None,
    }
}

/// Short name of an event kind for logs and the watch stream.
pub fn describe_event(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Create(_) => "create",
        EventKind::Modify(ModifyKind::Name(_)) => "rename",
        EventKind::Modify(_) => "modify",
        EventKind::Remove(_) => "remove",
        _ => "unknown",
    }
}

/// Batches rapid change events into a single regeneration.
///
/// A structural change anywhere in the batch makes the whole batch structural.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<ChangeKind>,
    paths: BTreeSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ChangeKind, paths: impl IntoIterator<Item = PathBuf>) {
        self.add_at(kind, paths, Instant::now());
    }

    pub fn add_at(
        &mut self,
        kind: ChangeKind,
        paths: impl IntoIterator<Item = PathBuf>,
        now: Instant,
    ) {
        self.pending = self.pending.max(Some(kind));
        self.paths.extend(paths);
        self.last_event = Some(now);
    }

    pub fn ready(&self) -> bool {
        self.ready_at(Instant::now())
    }

    /// True once events have stopped arriving for the debounce window.
    pub fn ready_at(&self, now: Instant) -> bool {
        self.pending.is_some()
            && self
                .last_event
                .is_some_and(|t| now.saturating_duration_since(t) >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Drain the batch.
    pub fn take(&mut self) -> Option<(ChangeKind, Vec<PathBuf>)> {
        self.last_event = None;
        let kind = self.pending.take()?;
        Some((kind, std::mem::take(&mut self.paths).into_iter().collect()))
    }

    /// How long the event loop may block before checking again.
    pub fn timeout(&self) -> Duration {
        if self.pending.is_none() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}
