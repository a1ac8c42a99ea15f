//! Durable driver that keeps its table in memory and snapshots it to disk.
use super::{Driver, DriverResult};
use crate::data_table::DataTable;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Drivers currently open, keyed by canonical snapshot path.
static OPEN_SNAPSHOTS: Lazy<Mutex<HashMap<PathBuf, Weak<FileDriver>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A key/value store persisted as a bincode snapshot file.
///
/// The whole table is rewritten after every mutation, so entries survive a
/// process restart as soon as the call that wrote them returns.
#[derive(Debug)]
pub struct FileDriver {
    path: PathBuf,
    table: RwLock<DataTable>,
}

impl FileDriver {
    /// Opens the snapshot at `path`, creating parent directories as needed.
    /// A missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> DriverResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let table = if path.exists() {
            let bytes = fs::read(&path)?;
            let table: DataTable = bincode::deserialize(&bytes)?;
            tracing::debug!(path = %path.display(), entries = table.len(), "loaded storage snapshot");
            table
        } else {
            DataTable::new()
        };

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    /// Returns the driver already open for `path`, opening it if needed.
    ///
    /// Every handle naming the same file shares one table, so a snapshot
    /// written through one handle never drops keys written through another.
    pub fn shared(path: impl Into<PathBuf>) -> DriverResult<Arc<Self>> {
        let path = canonical_path(&path.into())?;
        let mut open = OPEN_SNAPSHOTS.lock();
        if let Some(driver) = open.get(&path).and_then(Weak::upgrade) {
            return Ok(driver);
        }

        open.retain(|_, driver| driver.strong_count() > 0);
        let driver = Arc::new(Self::open(path.clone())?);
        open.insert(path, Arc::downgrade(&driver));
        Ok(driver)
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, table: &DataTable) -> DriverResult<()> {
        let bytes = bincode::serialize(table)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Resolves the directory part of `path`, creating it if missing.
fn canonical_path(path: &Path) -> DriverResult<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let dir = fs::canonicalize(parent)?;
    Ok(match path.file_name() {
        Some(name) => dir.join(name),
        None => dir,
    })
}

impl Driver for FileDriver {
    fn get(&self, key: &str) -> DriverResult<Option<String>> {
        Ok(self.table.read().get_value(key).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> DriverResult<()> {
        let mut table = self.table.write();
        let previous = table.set_value(key, value);
        if let Err(err) = self.save(&table) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => table.set_value(key, &old),
                None => table.delete_value(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> DriverResult<()> {
        let mut table = self.table.write();
        if table.delete_value(key).is_some() {
            self.save(&table)?;
        }
        Ok(())
    }

    fn has(&self, key: &str) -> DriverResult<bool> {
        Ok(self.table.read().has_key(key))
    }

    fn clear(&self) -> DriverResult<()> {
        let mut table = self.table.write();
        table.clear();
        self.save(&table)
    }

    fn entries(&self) -> DriverResult<Vec<(String, String)>> {
        Ok(self.table.read().entries())
    }

    fn keys(&self) -> DriverResult<Vec<String>> {
        Ok(self.table.read().all_keys())
    }

    fn len(&self) -> DriverResult<usize> {
        Ok(self.table.read().len())
    }
}
