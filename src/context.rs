use crate::error::{Error, Result};
use std::path::Path;

/// Visible contents of the directory the question is asked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    /// Absolute path of the listed directory.
    pub current_dir: String,
    /// Entry names sorted by name; directories end with `/`.
    pub entries: Vec<String>,
}

impl DirectorySnapshot {
    /// Snapshot the process working directory.
    pub fn collect() -> Result<Self> {
        let dir = std::env::current_dir().map_err(|source| Error::Context {
            action: "get current directory",
            source,
        })?;
        Self::from_dir(&dir)
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read_err = |source: std::io::Error| Error::Context {
            action: "read directory contents",
            source,
        };

        let mut listed = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Hidden entries (.git, .env, ...) are never shown to the model.
            if name.starts_with('.') {
                continue;
            }
            // file_type() does not follow symlinks.
            let is_dir = entry.file_type().map_err(read_err)?.is_dir();
            listed.push((name, is_dir));
        }

        // Sort on the bare name so the `/` marker does not affect order.
        listed.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let entries: Vec<String> = listed
            .into_iter()
            .map(|(name, is_dir)| if is_dir { name + "/" } else { name })
            .collect();

        tracing::debug!(dir = %dir.display(), entries = entries.len(), "collected directory snapshot");
        Ok(Self {
            current_dir: dir.display().to_string(),
            entries,
        })
    }
}
