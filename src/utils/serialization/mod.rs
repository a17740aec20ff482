use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::Path;

pub trait Serializer {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<Vec<u8>>;
    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T>;
}

/// JSON encoding; pretty output is what the import tooling expects on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    pub pretty: bool,
}

impl JsonSerializer {
    pub fn pretty() -> Self {
        JsonSerializer { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<Vec<u8>> {
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };
        if self.pretty {
            bytes.push(b'\n');
        }
        Ok(bytes)
    }

    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        serde_json::from_slice(data).map_err(Into::into)
    }
}

pub trait FileSerializer {
    fn save_to_file<T, S: Serializer>(&self, path: &Path, data: &T, serializer: &S) -> Result<()>
    where
        T: Serialize;
    fn load_from_file<T, S: Serializer>(&self, path: &Path, serializer: &S) -> Result<T>
    where
        T: DeserializeOwned;
}

pub struct FileUtils;

impl FileUtils {
    /// Write text, creating parent directories as needed.
    pub fn write_text(path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
    }

    /// File-system friendly stem for a workflow name.
    pub fn file_stem(name: &str) -> String {
        let mut stem = String::with_capacity(name.len());
        for c in name.trim().chars() {
            if c.is_alphanumeric() {
                stem.extend(c.to_lowercase());
            } else if !stem.ends_with('-') && !stem.is_empty() {
                stem.push('-');
            }
        }
        let stem = stem.trim_end_matches('-').to_string();
        if stem.is_empty() {
            "workflow".to_string()
        } else {
            stem
        }
    }
}

impl FileSerializer for FileUtils {
    fn save_to_file<T, S: Serializer>(&self, path: &Path, data: &T, serializer: &S) -> Result<()>
    where
        T: Serialize,
    {
        let content = serializer.serialize(data)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    fn load_from_file<T, S: Serializer>(&self, path: &Path, serializer: &S) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let content =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        serializer.deserialize(&content)
    }
}
