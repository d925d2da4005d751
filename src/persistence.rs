//! Versioned, explicit-schema persistence for the KB, proof cache, and
//! portfolio statistics. Writes go through a temp-file-then-rename so a
//! crash mid-write can never corrupt the on-disk artifact.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::portfolio::PerformanceRecord;
use crate::provers::Verdict;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    pub verdict: Verdict,
    pub reason: String,
    pub inserted_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub parser_stats: HashMap<String, serde_json::Value>,
    /// Keyed by `"<kb fingerprint>\u{1}<goal>"`.
    #[serde(default)]
    pub proof_cache: HashMap<String, CachedEntry>,
    #[serde(default)]
    pub portfolio_stats: HashMap<String, PerformanceRecord>,
    /// Out-of-scope RAG state, carried through unread and unwritten-back
    /// in its legacy shape (see `migrate_legacy_rag_chunks`).
    #[serde(default)]
    pub rag_data: Option<serde_json::Value>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            facts: Vec::new(),
            parser_stats: HashMap::new(),
            proof_cache: HashMap::new(),
            portfolio_stats: HashMap::new(),
            rag_data: None,
        }
    }
}

/// Loads persisted state from `path`. A missing file, unreadable file,
/// or malformed contents all degrade to an empty, default state rather
/// than failing the caller — the kernel always starts up.
pub fn load(path: &Path) -> PersistedState {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return PersistedState::default(),
    };

    let mut value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("persisted state at {path:?} is not valid JSON: {e}");
            return PersistedState::default();
        }
    };

    migrate_legacy_rag_chunks(&mut value);

    match serde_json::from_value::<PersistedState>(value) {
        Ok(state) => {
            log::info!(
                "loaded {} fact(s) and {} cached proof(s) from {path:?}",
                state.facts.len(),
                state.proof_cache.len()
            );
            state
        }
        Err(e) => {
            log::warn!("persisted state at {path:?} is incomplete: {e}");
            PersistedState::default()
        }
    }
}

/// Saves `state` to `path` via write-then-rename. Failures are
/// surfaced: the driver decides whether a failed save is fatal.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), KernelError> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| KernelError::Persistence(format!("failed to serialize state: {e}")))?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json)
        .map_err(|e| KernelError::Persistence(format!("failed to write {tmp_path:?}: {e}")))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| KernelError::Persistence(format!("failed to rename into {path:?}: {e}")))?;
    Ok(())
}

/// Detects the legacy `rag_data.chunks = [[text, source], ...]` shape and
/// migrates each pair to `{text, source}`. RAG itself is out of scope
/// for this kernel; this only keeps old artifacts loadable.
fn migrate_legacy_rag_chunks(value: &mut serde_json::Value) {
    let Some(chunks) = value
        .get_mut("rag_data")
        .and_then(|rag| rag.get_mut("chunks"))
        .and_then(|c| c.as_array_mut())
    else {
        return;
    };
    let mut migrated = false;
    for chunk in chunks.iter_mut() {
        if let Some(pair) = chunk.as_array() {
            if pair.len() == 2 {
                let text = pair[0].clone();
                let source = pair[1].clone();
                *chunk = serde_json::json!({ "text": text, "source": source });
                migrated = true;
            }
        }
    }
    if migrated {
        log::info!("migrated legacy rag_data.chunks tuple format on load");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        let mut state = PersistedState::default();
        state.facts.push("Foo().".to_string());
        save(&path, &state).unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.facts, vec!["Foo().".to_string()]);
        assert_eq!(loaded.version, CURRENT_VERSION);
    }

    #[test]
    fn missing_file_yields_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let loaded = load(&path);
        assert!(loaded.facts.is_empty());
    }

    #[test]
    fn migrates_legacy_rag_chunks_tuple_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{"version":1,"facts":[],"rag_data":{"chunks":[["hello world","doc.txt"]]}}"#,
        )
        .unwrap();
        let loaded = load(&path);
        let rag = loaded.rag_data.expect("rag_data should survive migration");
        let chunk = &rag["chunks"][0];
        assert_eq!(chunk["text"], "hello world");
        assert_eq!(chunk["source"], "doc.txt");
    }

    #[test]
    fn malformed_json_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ this is not json").unwrap();
        let loaded = load(&path);
        assert!(loaded.facts.is_empty());
    }
}
