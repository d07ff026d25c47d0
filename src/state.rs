//! Persistence of the last processed notification id.
//!
//! The marker is a plain text file holding one decimal integer. A missing
//! file means the bot has never run and must only record a baseline.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StateError;

/// File-backed store for the last-seen marker.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored marker, or `None` when no state has been persisted yet.
    pub async fn load(&self) -> Result<Option<u64>, StateError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        contents
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StateError::Corrupt {
                path: self.path.clone(),
                contents,
            })
    }

    /// Replace the stored marker.
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the
    /// marker, so a reader sees either the old value or the new one.
    pub async fn save(&self, id: u64) -> Result<(), StateError> {
        let tmp = self.tmp_path();
        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut file = fs::File::create(&tmp).await.map_err(write_err)?;
        file.write_all(id.to_string().as_bytes())
            .await
            .map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&tmp, &self.path).await.map_err(write_err)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// In-memory marker owned by the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingState {
    last_notification_id: Option<u64>,
    changed: bool,
}

impl ProcessingState {
    /// Resume from a loaded marker (`None` = first run).
    pub fn new(last_notification_id: Option<u64>) -> Self {
        Self {
            last_notification_id,
            changed: false,
        }
    }

    pub fn last_notification_id(&self) -> Option<u64> {
        self.last_notification_id
    }

    pub fn is_unset(&self) -> bool {
        self.last_notification_id.is_none()
    }

    /// Whether `id` is newer than the marker. Nothing is new while unset.
    pub fn is_new(&self, id: u64) -> bool {
        self.last_notification_id.is_some_and(|last| id > last)
    }

    /// Record the first-run baseline.
    pub fn set_baseline(&mut self, id: u64) {
        self.last_notification_id = Some(id);
        self.changed = true;
    }

    /// Move the marker forward; older ids are ignored.
    pub fn advance(&mut self, id: u64) {
        if self.last_notification_id.is_none_or(|last| id > last) {
            self.last_notification_id = Some(id);
            self.changed = true;
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Clear the changed flag at the start of a cycle.
    pub fn begin_cycle(&mut self) {
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("last_notification"))
    }

    #[tokio::test]
    async fn load_missing_is_unset() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(109876543210).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(109876543210));
    }

    #[tokio::test]
    async fn save_overwrites_longer_value() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(123456789).await.unwrap();
        store.save(7).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "7");
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(1).await.unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("last_notification")]);
    }

    #[tokio::test]
    async fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("a/b/state"));
        store.save(5).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn load_tolerates_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "42\n").unwrap();
        assert_eq!(store.load().await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn load_garbage_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "4x2").unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StateError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn load_empty_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();
        assert!(matches!(
            store.load().await.unwrap_err(),
            StateError::Corrupt { .. }
        ));
    }

    #[test]
    fn unset_state_sees_nothing_new() {
        let state = ProcessingState::new(None);
        assert!(state.is_unset());
        assert!(!state.is_new(1));
    }

    #[test]
    fn is_new_strictly_greater() {
        let state = ProcessingState::new(Some(10));
        assert!(!state.is_new(9));
        assert!(!state.is_new(10));
        assert!(state.is_new(11));
    }

    #[test]
    fn advance_is_monotonic() {
        let mut state = ProcessingState::new(Some(10));
        state.advance(5);
        assert_eq!(state.last_notification_id(), Some(10));
        assert!(!state.is_changed());
        state.advance(12);
        assert_eq!(state.last_notification_id(), Some(12));
        assert!(state.is_changed());
    }

    #[test]
    fn baseline_marks_changed() {
        let mut state = ProcessingState::new(None);
        state.set_baseline(0);
        assert_eq!(state.last_notification_id(), Some(0));
        assert!(state.is_changed());
        state.begin_cycle();
        assert!(!state.is_changed());
    }
}
