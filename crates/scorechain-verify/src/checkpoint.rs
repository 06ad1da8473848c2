//! Checkpoint persistence.
//!
//! A checkpoint is a small JSON file holding the last verified
//! `(sequence, hash)` pair, so a restarted process resumes incremental
//! verification instead of rescanning the whole chain.

use std::path::Path;

use tracing::debug;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    verify::Checkpoint,
};

/// Load a checkpoint from `path`.
///
/// A missing file is not an error — it simply means nothing has been
/// verified yet, and `None` is returned.  A present-but-unparseable
/// file is `Config`: silently restarting from genesis would hide that
/// the operator's checkpoint was damaged.
pub fn load(path: &Path) -> LedgerResult<Option<Checkpoint>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::Config {
        reason: format!("failed to read checkpoint '{}': {}", path.display(), e),
    })?;
    let checkpoint = serde_json::from_str(&contents).map_err(|e| LedgerError::Config {
        reason: format!("malformed checkpoint '{}': {}", path.display(), e),
    })?;
    Ok(Some(checkpoint))
}

/// Persist `checkpoint` to `path`, replacing any previous value.
pub fn save(path: &Path, checkpoint: &Checkpoint) -> LedgerResult<()> {
    let contents = serde_json::to_string(checkpoint).map_err(|e| LedgerError::Config {
        reason: format!("failed to serialize checkpoint: {}", e),
    })?;
    std::fs::write(path, contents).map_err(|e| LedgerError::Config {
        reason: format!("failed to write checkpoint '{}': {}", path.display(), e),
    })?;
    debug!(
        path = %path.display(),
        sequence = checkpoint.sequence,
        "checkpoint saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    struct TempFile(PathBuf);

    impl TempFile {
        fn new() -> Self {
            Self(
                std::env::temp_dir()
                    .join(format!("scorechain-checkpoint-{}.json", Uuid::new_v4())),
            )
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let file = TempFile::new();
        let checkpoint = Checkpoint {
            sequence: 17,
            hash: "ab".repeat(32),
        };
        save(&file.0, &checkpoint).unwrap();
        assert_eq!(load(&file.0).unwrap(), Some(checkpoint));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let file = TempFile::new();
        assert_eq!(load(&file.0).unwrap(), None);
    }

    #[test]
    fn damaged_checkpoint_is_a_config_error() {
        let file = TempFile::new();
        std::fs::write(&file.0, "not json").unwrap();
        let err = load(&file.0).unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
    }
}
