//! The scratch directory: a throwaway, instance-scoped directory that gives
//! the engine a filesystem-shaped view of the context files.
//!
//! Each `SandboxAdapter` owns exactly one scratch directory. Every
//! `process_message` call rewrites the full context-file set into it, so
//! leftover state from a cancelled call is overwritten rather than corrupting
//! the next call. The directory is deleted when the `ScratchDir` drops.

use std::fs;
use std::path::{Component, Path};
use tempfile::TempDir;

use crate::errors::AdapterError;

/// Instance-owned scratch directory under the system temp root.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Result<Self, AdapterError> {
        let dir = tempfile::Builder::new()
            .prefix("drydock-scratch-")
            .tempdir()
            .map_err(|source| AdapterError::Scratch {
                path: std::env::temp_dir(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the directory contents with exactly the given files.
    /// Relative paths only; anything that would escape the scratch root is
    /// rejected.
    pub fn materialize(&self, files: &[(String, String)]) -> Result<(), AdapterError> {
        self.clear()?;
        for (path, content) in files {
            let rel = Path::new(path);
            if !is_safe_relative(rel) {
                return Err(AdapterError::Scratch {
                    path: rel.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "path escapes the scratch directory",
                    ),
                });
            }
            let target = self.dir.path().join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| AdapterError::Scratch {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&target, content).map_err(|source| AdapterError::Scratch {
                path: target.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AdapterError> {
        let root = self.dir.path();
        let entries = fs::read_dir(root).map_err(|source| AdapterError::Scratch {
            path: root.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| AdapterError::Scratch {
                path: root.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|source| AdapterError::Scratch { path, source })?;
        }
        Ok(())
    }
}

fn is_safe_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
