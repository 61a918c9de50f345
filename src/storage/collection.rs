//! Generic JSON-backed collection
//!
//! Every ledger entity lives in one `JsonCollection`: an in-memory map guarded
//! by a `RwLock`, loaded from and saved to a single JSON file. Entity-specific
//! queries are added as inherent impls in the sibling modules.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::CompanyId;

use super::file_io::{read_json, write_json_atomic};

/// An entity stored in a [`JsonCollection`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash + Display;

    fn id(&self) -> Self::Id;

    fn company_id(&self) -> CompanyId;

    /// Natural ordering of the collection
    fn created_at(&self) -> DateTime<Utc>;
}

/// On-disk layout of a collection file
#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Record")]
struct CollectionFile<T> {
    records: Vec<T>,
}

impl<T> Default for CollectionFile<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// Point-in-time copy of a collection's contents
pub struct CollectionSnapshot<T: Record>(HashMap<T::Id, T>);

pub struct JsonCollection<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> JsonCollection<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, LedgerError> {
        self.data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, LedgerError> {
        self.data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing the in-memory contents
    pub fn load(&self) -> Result<(), LedgerError> {
        let file: CollectionFile<T> = read_json(&self.path)?;

        let mut data = self.write()?;
        data.clear();
        for record in file.records {
            data.insert(record.id(), record);
        }

        Ok(())
    }

    /// Save records to disk in their natural order
    pub fn save(&self) -> Result<(), LedgerError> {
        let records = self.all()?;
        write_json_atomic(&self.path, &CollectionFile { records })
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Get a record only if it belongs to `company_id`
    pub fn get_scoped(&self, company_id: CompanyId, id: T::Id) -> Result<Option<T>, LedgerError> {
        Ok(self
            .read()?
            .get(&id)
            .filter(|r| r.company_id() == company_id)
            .cloned())
    }

    /// All records ordered by creation time
    pub fn all(&self) -> Result<Vec<T>, LedgerError> {
        let mut records: Vec<T> = self.read()?.values().cloned().collect();
        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }

    /// Records matching `predicate`, ordered by creation time
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, LedgerError>
    where
        F: Fn(&T) -> bool,
    {
        let mut records: Vec<T> = self
            .read()?
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }

    pub fn for_company(&self, company_id: CompanyId) -> Result<Vec<T>, LedgerError> {
        self.filter(|r| r.company_id() == company_id)
    }

    pub fn upsert(&self, record: T) -> Result<(), LedgerError> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    /// Remove a record, returning it if it existed
    pub fn remove(&self, id: T::Id) -> Result<Option<T>, LedgerError> {
        Ok(self.write()?.remove(&id))
    }

    /// Remove every record matching `predicate`, returning the removed records
    pub fn remove_where<F>(&self, predicate: F) -> Result<Vec<T>, LedgerError>
    where
        F: Fn(&T) -> bool,
    {
        let mut data = self.write()?;
        let ids: Vec<T::Id> = data
            .values()
            .filter(|r| predicate(r))
            .map(Record::id)
            .collect();
        Ok(ids.into_iter().filter_map(|id| data.remove(&id)).collect())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }

    pub fn snapshot(&self) -> Result<CollectionSnapshot<T>, LedgerError> {
        Ok(CollectionSnapshot(self.read()?.clone()))
    }

    pub fn restore(&self, snapshot: CollectionSnapshot<T>) -> Result<(), LedgerError> {
        *self.write()? = snapshot.0;
        Ok(())
    }
}
