// ABOUTME: Session cache persistence — save and load SessionState as JSON per workspace.
// ABOUTME: Atomic writes via tmp + rename; unreadable state degrades to an empty cache.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cache::SessionState;
use crate::config::Config;

/// On-disk envelope around the cache state.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionFile {
    pub workspace_dir: String,
    pub updated_at: String,
    pub state: SessionState,
}

/// Computes a deterministic hex hash of the workspace directory path.
pub fn workspace_hash(workspace_dir: &Path) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::hash::DefaultHasher::new();
    workspace_dir.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Path to the session cache file for a given workspace directory.
pub fn session_state_path(workspace_dir: &Path) -> PathBuf {
    let hash = workspace_hash(workspace_dir);
    Config::sessions_dir().join(&hash).join("session-cache.json")
}

/// Load cache state from an explicit path.
///
/// A missing or corrupt file yields a fresh state; nothing is repaired.
pub fn load_state_from(path: &Path) -> SessionState {
    if !path.exists() {
        return SessionState::default();
    }
    match read_session_file(path) {
        Ok(file) => file.state,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding unreadable session cache");
            SessionState::default()
        }
    }
}

fn read_session_file(path: &Path) -> anyhow::Result<SessionFile> {
    let content = std::fs::read_to_string(path)?;
    let file: SessionFile = serde_json::from_str(&content)?;
    Ok(file)
}

/// Save cache state to an explicit path (atomic write via tmp + rename).
pub fn save_state_to(path: &Path, workspace_dir: &Path, state: &SessionState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = SessionFile {
        workspace_dir: workspace_dir.to_string_lossy().to_string(),
        updated_at: Utc::now().to_rfc3339(),
        state: state.clone(),
    };
    let tmp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(&file)?;
    std::fs::write(&tmp_path, &content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
