use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use storefront_core::{Storage, StorageError};

/// Durable [`Storage`] kept in a single JSON object file.
///
/// The whole file is loaded on open and rewritten on every mutation, so the
/// on-disk copy always matches what readers see. A missing or unreadable
/// file opens as empty storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("ignoring corrupt storage file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                log::warn!("cannot read storage file {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path,
            items: RefCell::new(items),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, key: &str) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(&*self.items.borrow()).map_err(|err| {
            StorageError::Encode {
                key: key.to_owned(),
                message: err.to_string(),
            }
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                key: key.to_owned(),
                source,
            })?;
        }
        fs::write(&self.path, encoded).map_err(|source| StorageError::Io {
            key: key.to_owned(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.flush(key)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.items.borrow_mut().remove(key).is_some() {
            self.flush(key)?;
        }
        Ok(())
    }
}
