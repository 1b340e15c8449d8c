//! Thread id -> creator mapping, persisted as JSON so close prompts and
//! transcripts still know the opener after a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::BotError;

pub struct TicketStore {
    path: PathBuf,
    creators: Mutex<HashMap<u64, u64>>,
}

impl TicketStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let creators = load(&path).unwrap_or_default();
        Self {
            path,
            creators: Mutex::new(creators),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, u64>> {
        self.creators.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, thread: u64, creator: u64) -> Result<(), BotError> {
        let mut creators = self.lock();
        creators.insert(thread, creator);
        save(&self.path, &creators)
    }

    pub fn creator(&self, thread: u64) -> Option<u64> {
        self.lock().get(&thread).copied()
    }

    pub fn forget(&self, thread: u64) -> Result<(), BotError> {
        let mut creators = self.lock();
        creators.remove(&thread);
        save(&self.path, &creators)
    }

    pub fn is_ticket(&self, thread: u64) -> bool {
        self.lock().contains_key(&thread)
    }
}

fn load(path: &Path) -> Option<HashMap<u64, u64>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let parsed: HashMap<String, u64> = serde_json::from_str(&raw).ok()?;
    Some(
        parsed
            .into_iter()
            .filter_map(|(k, v)| Some((k.parse().ok()?, v)))
            .collect(),
    )
}

fn save(path: &Path, creators: &HashMap<u64, u64>) -> Result<(), BotError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let as_strings: HashMap<String, u64> =
        creators.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    std::fs::write(path, serde_json::to_string_pretty(&as_strings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_forgets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TicketStore::open(dir.path().join("tickets.json"));

        store.record(100, 42).expect("record");
        assert_eq!(store.creator(100), Some(42));
        assert!(store.is_ticket(100));

        store.forget(100).expect("forget");
        assert_eq!(store.creator(100), None);
        assert!(!store.is_ticket(100));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tickets.json");
        TicketStore::open(&path).record(100, 42).expect("record");

        let reopened = TicketStore::open(&path);
        assert_eq!(reopened.creator(100), Some(42));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tickets.json");
        std::fs::write(&path, "not json").expect("write");

        let store = TicketStore::open(&path);
        assert_eq!(store.creator(1), None);
        // And the store can still write afterwards.
        store.record(1, 2).expect("record");
    }
}
