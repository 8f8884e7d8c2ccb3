//! File watching for shader hot reload.
//!
//! The watcher only collects changed paths. Reloading happens when the
//! render loop polls it, on the thread that owns the caches.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{trace, warn};

/// Watches a shader directory and queues the paths of modified files.
pub struct ShaderWatcher {
	root: PathBuf,
	events: Receiver<PathBuf>,
	_watcher: RecommendedWatcher,
}

impl ShaderWatcher {
	/// Start watching `root` recursively.
	pub fn new(root: impl AsRef<Path>) -> notify::Result<Self> {
		let root = canonical(root.as_ref());
		let (tx, events) = mpsc::channel();

		let mut watcher = RecommendedWatcher::new(
			move |res: notify::Result<Event>| match res {
				Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
					for path in event.paths {
						trace!(path = %path.display(), "shader file changed");
						// The receiver is gone once the watcher is dropped.
						let _ = tx.send(path);
					}
				}
				Ok(_) => {}
				Err(err) => warn!(error = %err, "shader watch error"),
			},
			Config::default(),
		)?;
		watcher.watch(&root, RecursiveMode::Recursive)?;

		Ok(Self {
			root,
			events,
			_watcher: watcher,
		})
	}

	/// Canonical path of the watched directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Drain every change queued so far without blocking.
	///
	/// Paths are canonical and deduplicated; an editor saving one file
	/// usually produces several events.
	pub fn changed_paths(&self) -> BTreeSet<PathBuf> {
		self.events.try_iter().map(|path| canonical(&path)).collect()
	}

	/// Wait up to `timeout` for at least one change, then drain the queue.
	///
	/// Returns an empty set on timeout.
	pub fn wait_changed(&self, timeout: Duration) -> BTreeSet<PathBuf> {
		let deadline = Instant::now() + timeout;
		let mut changed = BTreeSet::new();

		match self.events.recv_timeout(timeout) {
			Ok(path) => {
				changed.insert(canonical(&path));
			}
			Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return changed,
		}

		// Editors often write in bursts; let the burst settle briefly.
		let settle = deadline.saturating_duration_since(Instant::now()).min(Duration::from_millis(50));
		std::thread::sleep(settle);
		changed.extend(self.changed_paths());
		changed
	}
}

/// Canonicalize when the path exists, otherwise keep it as given.
pub(crate) fn canonical(path: &Path) -> PathBuf {
	path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn test_no_changes_without_writes() {
		let dir = tempfile::tempdir().expect("tempdir");
		let watcher = ShaderWatcher::new(dir.path()).expect("watch tempdir");

		assert!(watcher.changed_paths().is_empty());
		assert_eq!(watcher.root(), canonical(dir.path()));
	}

	#[test]
	fn test_reports_written_file() {
		let dir = tempfile::tempdir().expect("tempdir");
		let watcher = ShaderWatcher::new(dir.path()).expect("watch tempdir");

		let shader = dir.path().join("scene.hlsl");
		fs::write(&shader, "float4 PSMain() {}").expect("write shader");

		let changed = watcher.wait_changed(Duration::from_secs(5));
		assert!(changed.contains(&canonical(&shader)), "changed: {changed:?}");
	}
}
