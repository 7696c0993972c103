//! Snapshot storage boundary for the session layer.
//!
//! The engine never touches storage; whoever orchestrates sessions keeps
//! snapshots behind this repository interface. Two implementations ship:
//! a lock-guarded in-memory map for tests and embedded use, and a
//! directory of pretty-printed JSON files for local persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;

use orbit_core::GameState;

/// Key-value snapshot repository, keyed by session id.
pub trait SnapshotStore {
    fn save(&self, session_id: &str, state: &GameState) -> Result<()>;
    fn load(&self, session_id: &str) -> Result<Option<GameState>>;
    /// Known session ids, sorted for stable listings.
    fn list(&self) -> Result<Vec<String>>;
    /// Removing an unknown session is not an error.
    fn delete(&self, session_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Shared in-memory store. Snapshots are kept as JSON strings so `load`
/// always hands back an independent copy.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, session_id: &str, state: &GameState) -> Result<()> {
        let json = serde_json::to_string(state).context("serializing snapshot")?;
        self.sessions.write().insert(session_id.to_string(), json);
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<GameState>> {
        let sessions = self.sessions.read();
        let Some(json) = sessions.get(session_id) else {
            return Ok(None);
        };
        let state = serde_json::from_str(json)
            .with_context(|| format!("deserializing snapshot for session '{session_id}'"))?;
        Ok(Some(state))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.write().remove(session_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON directory store
// ---------------------------------------------------------------------------

/// One pretty-printed `<session_id>.json` per session under a directory.
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }
}

impl SnapshotStore for JsonDirStore {
    fn save(&self, session_id: &str, state: &GameState) -> Result<()> {
        let path = self.path_for(session_id);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, state)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<GameState>> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let state =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(state))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("listing {}", self.dir.display()))?;
        for entry in entries {
            let path = entry.context("reading directory entry")?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.path_for(session_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("deleting {}", path.display())),
        }
    }
}

/// Convenience for callers that only hold a path.
pub fn open_dir_store(dir: &Path) -> Result<JsonDirStore> {
    JsonDirStore::new(dir)
}
