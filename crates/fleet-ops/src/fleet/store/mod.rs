//! Typed access to the persisted fleet collections.
//!
//! Each collection is stored under a fixed key as a versioned JSON envelope. Plain reads never
//! fail: absent or unreadable data yields an empty collection and malformed records are skipped.
//! Writes decode strictly and refuse to replace a collection they could not read in full.

mod backend;
mod records;

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::domain::EntityId;

pub use backend::{FileStore, KeyValueStore, MemoryStore, StoreBackend};
pub use records::Record;

/// Current persisted layout version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    Drivers,
    Vehicles,
    Rides,
    Challans,
    Notifications,
    Clusters,
}

impl StorageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drivers => "cab_drivers",
            Self::Vehicles => "cab_vehicles",
            Self::Rides => "cab_rides",
            Self::Challans => "cab_challans",
            Self::Notifications => "cab_notifications",
            Self::Clusters => "cab_clusters",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io failure{}: {source}", key_suffix(.key))]
    Io {
        key: Option<StorageKey>,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{key} is unreadable: {source}")]
    Unreadable {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} was written by schema version {version}; this build supports {}", SCHEMA_VERSION)]
    NewerSchema { key: StorageKey, version: u32 },
    #[error("{key} record {index} is malformed: {source}")]
    MalformedRecord {
        key: StorageKey,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn key_suffix(key: &Option<StorageKey>) -> String {
    key.map(|key| format!(" for {key}")).unwrap_or_default()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    schema_version: u32,
    records: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        records: Vec<Value>,
    },
    Legacy(Vec<Value>),
}

/// Lenient decode used by plain reads.
pub(crate) fn decode_collection<T: Record>(key: StorageKey, raw: &str) -> Vec<T> {
    match read_collection(key, raw, false) {
        Ok(records) => records,
        Err(err) => {
            warn!(%key, error = %err, "persisted collection ignored; using empty collection");
            Vec::new()
        }
    }
}

/// Decode a stored collection. In strict mode the first malformed record is an error; otherwise
/// it is logged and skipped.
pub(crate) fn read_collection<T: Record>(
    key: StorageKey,
    raw: &str,
    strict: bool,
) -> Result<Vec<T>, StoreError> {
    let stored = serde_json::from_str::<StoredCollection>(raw)
        .map_err(|source| StoreError::Unreadable { key, source })?;

    let (version, values) = match stored {
        StoredCollection::Versioned {
            schema_version,
            records,
        } => (schema_version, records),
        StoredCollection::Legacy(records) => (0, records),
    };

    if version > SCHEMA_VERSION {
        return Err(StoreError::NewerSchema { key, version });
    }

    let mut decoded = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => decoded.push(record),
            Err(source) if strict => {
                return Err(StoreError::MalformedRecord { key, index, source })
            }
            Err(err) => warn!(%key, index, error = %err, "skipping malformed record"),
        }
    }
    Ok(decoded)
}

pub(crate) fn encode_collection<T: Record>(records: &[T]) -> Result<String, StoreError> {
    serde_json::to_string(&Envelope {
        schema_version: SCHEMA_VERSION,
        records,
    })
    .map_err(|source| StoreError::Serialize {
        key: T::KEY,
        source,
    })
}

/// Repository over a [`KeyValueStore`]. Every read-modify-write runs under one writer lock.
#[derive(Debug)]
pub struct EntityStore<S> {
    backend: S,
    writer: Mutex<()>,
}

impl<S: KeyValueStore> EntityStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            writer: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load a whole collection, falling back to an empty one on any read problem.
    pub fn all<T: Record>(&self) -> Vec<T> {
        match self.backend.get(T::KEY) {
            Ok(Some(raw)) => decode_collection(T::KEY, &raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %T::KEY, error = %err, "collection read failed; using empty collection");
                Vec::new()
            }
        }
    }

    pub fn find<T: Record>(&self, id: &EntityId) -> Option<T> {
        self.all::<T>().into_iter().find(|record| record.id() == id)
    }

    pub fn save_all<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write(records)
    }

    /// Append a record under a freshly generated identifier.
    pub fn add<T: Record>(&self, record: T) -> Result<T, StoreError> {
        self.try_add(record, |_: &[T], _: &T| Ok(()))
    }

    /// Append a record after `check` accepts it against the current collection. The check runs
    /// under the writer lock.
    pub fn try_add<T, E, F>(&self, mut record: T, check: F) -> Result<T, E>
    where
        T: Record,
        E: From<StoreError>,
        F: FnOnce(&[T], &T) -> Result<(), E>,
    {
        record.assign_id(EntityId::generate());
        let _guard = self.lock();
        let mut records = self.load_for_write::<T>()?;
        check(&records, &record)?;
        records.push(record.clone());
        self.write(&records)?;
        Ok(record)
    }

    /// Apply `mutate` to the record with `id`. Unknown ids return `Ok(None)`.
    pub fn update<T, F>(&self, id: &EntityId, mutate: F) -> Result<Option<T>, StoreError>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        self.try_update(id, |_: &[T], record: &mut T| {
            mutate(record);
            Ok::<(), StoreError>(())
        })
    }

    /// Like [`update`](Self::update), but `mutate` sees the rest of the collection and may reject
    /// the change. A rejected change leaves the stored collection untouched.
    pub fn try_update<T, E, F>(&self, id: &EntityId, mutate: F) -> Result<Option<T>, E>
    where
        T: Record,
        E: From<StoreError>,
        F: FnOnce(&[T], &mut T) -> Result<(), E>,
    {
        let _guard = self.lock();
        let mut records = self.load_for_write::<T>()?;
        let Some(position) = records.iter().position(|record| record.id() == id) else {
            debug!(key = %T::KEY, %id, "update skipped; unknown id");
            return Ok(None);
        };

        let mut candidate = records[position].clone();
        mutate(&records, &mut candidate)?;
        records[position] = candidate.clone();
        self.write(&records)?;
        Ok(Some(candidate))
    }

    /// Remove the record with `id`, reporting whether anything was removed.
    pub fn delete<T: Record>(&self, id: &EntityId) -> Result<bool, StoreError> {
        let _guard = self.lock();
        let mut records = self.load_for_write::<T>()?;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            debug!(key = %T::KEY, %id, "delete skipped; unknown id");
            return Ok(false);
        }

        self.write(&records)?;
        Ok(true)
    }

    /// Run an arbitrary read-modify-write over one collection.
    pub fn modify<T, F, R>(&self, change: F) -> Result<R, StoreError>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.lock();
        let mut records = self.load_for_write::<T>()?;
        let outcome = change(&mut records);
        self.write(&records)?;
        Ok(outcome)
    }

    /// Initialise a collection that has never been written. A collection the operator emptied
    /// stays empty. Returns `true` when the seed was written.
    pub fn seed_if_absent<T: Record>(&self, records: &[T]) -> Result<bool, StoreError> {
        let _guard = self.lock();
        if self.backend.get(T::KEY)?.is_some() {
            return Ok(false);
        }

        self.write(records)?;
        Ok(true)
    }

    /// Strict load for read-modify-write paths. Anything short of a full decode is an error.
    fn load_for_write<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        match self.backend.get(T::KEY)? {
            Some(raw) => read_collection(T::KEY, &raw, true),
            None => Ok(Vec::new()),
        }
    }

    fn write<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let encoded = encode_collection(records)?;
        self.backend.set(T::KEY, &encoded)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
