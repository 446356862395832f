use std::path::PathBuf;

use crate::{
    editor::controller::Selection,
    foundation::error::{RoundelError, RoundelResult},
};

/// Durable key-value storage for the persisted selection.
///
/// One fixed key holds the JSON `{id, url}` of the last saved selection.
/// Implementations must treat a missing key as `Ok(None)`; transport or
/// medium failures are [`RoundelError::Storage`], which callers catch and
/// continue from unsaved.
pub trait SelectionStore {
    /// Read the selection stored under `key`, if any well-formed one exists.
    fn read(&self, key: &str) -> RoundelResult<Option<Selection>>;

    /// Replace the selection stored under `key`.
    fn write(&self, key: &str, selection: &Selection) -> RoundelResult<()>;
}

#[derive(Clone, Debug)]
/// File-backed [`SelectionStore`]: one JSON file per key inside a directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store writing under the given directory (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SelectionStore for JsonFileStore {
    fn read(&self, key: &str) -> RoundelResult<Option<Selection>> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(RoundelError::storage(format!(
                    "read '{}': {err}",
                    path.display()
                )));
            }
        };

        match serde_json::from_slice::<Selection>(&bytes) {
            Ok(selection) => Ok(Some(selection)),
            Err(err) => {
                // A malformed stored value is ignored, not fatal.
                tracing::warn!(key, %err, "stored selection is malformed, ignoring");
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, selection: &Selection) -> RoundelResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|err| {
            RoundelError::storage(format!("create '{}': {err}", self.dir.display()))
        })?;
        let json = serde_json::to_vec_pretty(selection)
            .map_err(|err| RoundelError::storage(format!("serialize selection: {err}")))?;
        let path = self.path_for(key);
        std::fs::write(&path, json)
            .map_err(|err| RoundelError::storage(format!("write '{}': {err}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/persist.rs"]
mod tests;
