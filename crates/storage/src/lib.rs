use areaclone_core::ReconstructConfig;
use directories::ProjectDirs;
use doc_model::EditorSession;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SESSION_SCHEMA_VERSION: u32 = 1;
const SESSION_FILE: &str = "session.json";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported session schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionEnvelope {
    version: u32,
    session: EditorSession,
}

/// Read a session file; a missing file is an empty session
pub fn read_session(path: &Path) -> Result<EditorSession, StorageError> {
    if !path.exists() {
        return Ok(EditorSession::default());
    }

    let bytes = fs::read(path)?;
    let envelope: SessionEnvelope = serde_json::from_slice(&bytes)?;
    if envelope.version != SESSION_SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: envelope.version,
            expected: SESSION_SCHEMA_VERSION,
        });
    }

    Ok(envelope.session)
}

pub fn write_session(path: &Path, session: &EditorSession) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let envelope = SessionEnvelope { version: SESSION_SCHEMA_VERSION, session: session.clone() };
    let bytes = serde_json::to_vec_pretty(&envelope)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a reconstruction config; keys it omits keep their defaults
pub fn read_config(path: &Path) -> Result<ReconstructConfig, StorageError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "areaclone", "areaclone")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_session(&self) -> Result<EditorSession, StorageError> {
        read_session(&self.session_path())
    }

    pub fn save_session(&self, session: &EditorSession) -> Result<(), StorageError> {
        write_session(&self.session_path(), session)
    }

    pub fn load_config(&self) -> Result<ReconstructConfig, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(ReconstructConfig::default());
        }
        read_config(&path)
    }

    pub fn save_config(&self, config: &ReconstructConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let bytes = serde_json::to_vec_pretty(config)?;
        fs::write(self.config_path(), bytes)?;
        Ok(())
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use areaclone_core::SampleMode;
    use doc_model::{apply_session_action, SessionAction};

    #[test]
    fn session_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path().join("nested"));

        let mut session = EditorSession::default();
        apply_session_action(
            &mut session,
            SessionAction::AddText { page: 2, x: 10.0, y: 20.0, text: "Hello".to_owned() },
        );
        apply_session_action(
            &mut session,
            SessionAction::AddLine { page: 2, x: 10.0, y: 40.0, width: 120.0 },
        );

        store.save_session(&session).expect("save should succeed");
        let loaded = store.load_session().expect("load should succeed");

        assert_eq!(loaded, session);
    }

    #[test]
    fn load_defaults_when_files_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        assert_eq!(store.load_session().expect("load should succeed"), EditorSession::default());
        assert_eq!(store.load_config().expect("load should succeed"), ReconstructConfig::default());
    }

    #[test]
    fn unknown_session_version_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let envelope = serde_json::json!({
            "version": 99,
            "session": serde_json::to_value(EditorSession::default()).expect("serialize"),
        });
        fs::write(store.session_path(), envelope.to_string()).expect("write should succeed");

        let err = store.load_session().expect_err("version 99 should be rejected");
        assert!(matches!(err, StorageError::UnsupportedVersion { found: 99, expected: 1 }));
    }

    #[test]
    fn partial_config_file_overrides_only_named_keys() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(store.config_path(), r#"{"sampler": {"mode": "grid", "near_white": 220}}"#)
            .expect("write should succeed");

        let config = store.load_config().expect("load should succeed");
        assert_eq!(config.sampler.mode, SampleMode::Grid);
        assert_eq!(config.sampler.near_white, 220.0);
        assert_eq!(config.gap_factor, 1.6);
    }

    #[test]
    fn config_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let config = ReconstructConfig { min_item_width: 24.0, ..ReconstructConfig::default() };
        store.save_config(&config).expect("save should succeed");

        assert_eq!(store.load_config().expect("load should succeed"), config);
    }
}
