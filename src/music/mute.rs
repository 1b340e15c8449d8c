//! Music-command mutes, persisted as a small JSON file so a restart does
//! not lift them. Expired entries are pruned whenever the store is touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteEntry {
    pub username: String,
    pub muted_by: u64,
    pub muted_by_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub minutes: i64,
}

pub struct MuteStore {
    path: PathBuf,
    entries: Mutex<HashMap<u64, MuteEntry>>,
}

impl MuteStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path).unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, MuteEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mute(
        &self,
        user: u64,
        username: &str,
        muted_by: u64,
        muted_by_name: &str,
        minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<MuteEntry, BotError> {
        let entry = MuteEntry {
            username: username.to_string(),
            muted_by,
            muted_by_name: muted_by_name.to_string(),
            start: now,
            end: now + Duration::minutes(minutes),
            minutes,
        };
        let mut entries = self.lock();
        entries.insert(user, entry.clone());
        save(&self.path, &entries)?;
        Ok(entry)
    }

    /// Returns false when the user had no active mute.
    pub fn unmute(&self, user: u64, now: DateTime<Utc>) -> Result<bool, BotError> {
        let mut entries = self.lock();
        prune(&mut entries, now);
        let removed = entries.remove(&user).is_some();
        save(&self.path, &entries)?;
        Ok(removed)
    }

    /// Active mute for the user, if any. Prunes expired entries as a side
    /// effect; pruning failures to persist are ignored here.
    pub fn active(&self, user: u64, now: DateTime<Utc>) -> Option<MuteEntry> {
        let mut entries = self.lock();
        if prune(&mut entries, now) {
            let _ = save(&self.path, &entries);
        }
        entries.get(&user).cloned()
    }
}

fn prune(entries: &mut HashMap<u64, MuteEntry>, now: DateTime<Utc>) -> bool {
    let before = entries.len();
    entries.retain(|_, entry| entry.end > now);
    entries.len() != before
}

fn load(path: &Path) -> Option<HashMap<u64, MuteEntry>> {
    let raw = std::fs::read_to_string(path).ok()?;
    // Keys are stringified ids on disk.
    let parsed: HashMap<String, MuteEntry> = serde_json::from_str(&raw).ok()?;
    Some(
        parsed
            .into_iter()
            .filter_map(|(k, v)| Some((k.parse().ok()?, v)))
            .collect(),
    )
}

fn save(path: &Path, entries: &HashMap<u64, MuteEntry>) -> Result<(), BotError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let as_strings: HashMap<String, &MuteEntry> =
        entries.iter().map(|(k, v)| (k.to_string(), v)).collect();
    std::fs::write(path, serde_json::to_string_pretty(&as_strings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MuteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MuteStore::open(dir.path().join("mutes.json"));
        (dir, store)
    }

    #[test]
    fn mute_is_active_until_expiry() {
        let (_dir, store) = store();
        let now = Utc::now();
        store.mute(7, "user", 1, "mod", 10, now).expect("mute");

        let entry = store.active(7, now + Duration::minutes(5)).expect("active");
        assert_eq!(entry.minutes, 10);
        assert!(store.active(7, now + Duration::minutes(11)).is_none());
    }

    #[test]
    fn unmute_removes_entry() {
        let (_dir, store) = store();
        let now = Utc::now();
        store.mute(7, "user", 1, "mod", 10, now).expect("mute");
        assert!(store.unmute(7, now).expect("unmute"));
        assert!(!store.unmute(7, now).expect("second unmute"));
        assert!(store.active(7, now).is_none());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mutes.json");
        let now = Utc::now();
        MuteStore::open(&path)
            .mute(7, "user", 1, "mod", 10, now)
            .expect("mute");

        let reopened = MuteStore::open(&path);
        assert!(reopened.active(7, now).is_some());
    }

    #[test]
    fn missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.active(1, Utc::now()).is_none());
    }
}
