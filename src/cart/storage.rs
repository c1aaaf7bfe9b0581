//! Durable local storage for the serialized cart.

use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the cart is persisted
pub const CART_STORAGE_KEY: &str = "antiqkart-cart";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw key/value slot holding the serialized cart.
///
/// Only `CartStore` talks to this; everything else goes through the store.
pub trait CartStorage: Send + Sync {
    /// Read the stored payload, `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, StorageError>;

    fn write(&self, data: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// One JSON file per storage key: `<data dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                action: "read",
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, data: &str) -> Result<(), StorageError> {
        let io_err = |action: &'static str, path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StorageError::Io {
                action,
                path,
                source,
            }
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err("create", parent))?;
        }

        // Write-then-rename so a crash never leaves a half-written cart
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(io_err("write", &tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err("replace", &self.path))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                action: "remove",
                path: self.path.clone(),
                source,
            }),
        }
    }
}
