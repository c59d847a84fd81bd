use cosmwasm_std::{Binary, Order, StdError, Storage};
use cw_storage_plus::{Bound, Item, Map};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::validation::ValidationErrors;

/// A record that can live in a [`Bucket`].
///
/// An empty `id` means the record has not been stored yet; `put` assigns
/// the next sequence value before validating.
pub trait Model: Serialize + DeserializeOwned {
    fn id(&self) -> &Binary;

    fn set_id(&mut self, id: Binary);

    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Derives the secondary key of a record. `None` input means "no record";
/// a `None` output means the record contributes no entry to the index.
pub type Indexer<T> = fn(Option<&T>) -> Option<Vec<u8>>;

/// Secondary index mapping a derived key to the primary ids carrying it.
///
/// Entries are stored as `(derived key, id) -> ()` so that a prefix scan
/// over the derived key yields ids in ascending order.
pub struct Index<'a, T> {
    name: &'a str,
    namespace: &'a str,
    indexer: Indexer<T>,
}

impl<'a, T> Index<'a, T> {
    pub fn new(name: &'a str, namespace: &'a str, indexer: Indexer<T>) -> Self {
        Self {
            name,
            namespace,
            indexer,
        }
    }

    /// Derived key for `record`, as stored in the index.
    pub fn key(&self, record: Option<&T>) -> Option<Vec<u8>> {
        (self.indexer)(record)
    }

    fn entries(&self) -> Map<'a, (Vec<u8>, Vec<u8>), ()> {
        Map::new(self.namespace)
    }

    /// Swaps the entry derived from `old` for the one derived from `new`.
    fn replace(
        &self,
        storage: &mut dyn Storage,
        id: &Binary,
        old: Option<&T>,
        new: Option<&T>,
    ) -> Result<(), StoreError> {
        let entries = self.entries();
        if let Some(key) = self.key(old) {
            entries.remove(storage, (key, id.to_vec()));
        }
        if let Some(key) = self.key(new) {
            entries.save(storage, (key, id.to_vec()), &())?;
        }
        Ok(())
    }

    fn ids(
        &self,
        storage: &dyn Storage,
        key: &[u8],
        start_after: Option<&Binary>,
        limit: Option<usize>,
    ) -> Result<Vec<Binary>, StoreError> {
        let min = start_after.map(|id| Bound::exclusive(id.to_vec()));
        let keys = self
            .entries()
            .prefix(key.to_vec())
            .keys(storage, min, None, Order::Ascending);

        let ids: Result<Vec<Binary>, StdError> = match limit {
            Some(limit) => keys.take(limit).map(|k| k.map(Binary::from)).collect(),
            None => keys.map(|k| k.map(Binary::from)).collect(),
        };
        Ok(ids?)
    }
}

/// Keyed container for one record kind.
///
/// Records are stored under their 8 byte big-endian id. New ids come from a
/// per-bucket counter kept in storage next to the records.
pub struct Bucket<'a, T> {
    kind: &'a str,
    namespace: &'a str,
    sequence: &'a str,
    indexes: Vec<Index<'a, T>>,
}

impl<'a, T: Model> Bucket<'a, T> {
    /// `kind` names the record in errors; `namespace` and `sequence` are the
    /// storage prefixes for the records and the id counter.
    pub fn new(kind: &'a str, namespace: &'a str, sequence: &'a str) -> Self {
        Self {
            kind,
            namespace,
            sequence,
            indexes: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: Index<'a, T>) -> Self {
        self.indexes.push(index);
        self
    }

    fn records(&self) -> Map<'a, Vec<u8>, T> {
        Map::new(self.namespace)
    }

    fn counter(&self) -> Item<'a, u64> {
        Item::new(self.sequence)
    }

    fn index(&self, name: &str) -> Result<&Index<'a, T>, StoreError> {
        self.indexes
            .iter()
            .find(|index| index.name == name)
            .ok_or_else(|| StoreError::UnknownIndex {
                bucket: self.kind.to_string(),
                index: name.to_string(),
            })
    }

    /// Last id handed out, 0 if the bucket never stored anything.
    pub fn last_sequence(&self, storage: &dyn Storage) -> Result<u64, StoreError> {
        Ok(self.counter().may_load(storage)?.unwrap_or_default())
    }

    /// Validates and stores `record`, assigning a fresh id when it has none.
    ///
    /// Nothing is written when validation fails, including the counter.
    pub fn put(&self, storage: &mut dyn Storage, record: &mut T) -> Result<Binary, StoreError> {
        let mut next = None;
        if record.id().is_empty() {
            let seq = self
                .last_sequence(storage)?
                .checked_add(1)
                .ok_or_else(|| StdError::generic_err(format!("{} sequence exhausted", self.kind)))?;
            record.set_id(Binary::from(seq.to_be_bytes().to_vec()));
            next = Some(seq);
        }

        if let Err(errs) = record.validate() {
            if next.is_some() {
                record.set_id(Binary::default());
            }
            return Err(StoreError::ValidationFailed(errs));
        }

        let id = record.id().clone();
        let old = match next {
            Some(_) => None,
            None => self.may_get(storage, &id)?,
        };
        for index in &self.indexes {
            index.replace(storage, &id, old.as_ref(), Some(&*record))?;
        }
        if let Some(seq) = next {
            self.counter().save(storage, &seq)?;
        }
        self.records().save(storage, id.to_vec(), record)?;

        Ok(id)
    }

    pub fn get(&self, storage: &dyn Storage, id: &Binary) -> Result<T, StoreError> {
        self.may_get(storage, id)?
            .ok_or_else(|| StoreError::NotFound {
                kind: self.kind.to_string(),
                id: hex::encode(id.as_slice()),
            })
    }

    pub fn may_get(&self, storage: &dyn Storage, id: &Binary) -> Result<Option<T>, StoreError> {
        self.records()
            .may_load(storage, id.to_vec())
            .map_err(|err| match err {
                StdError::ParseErr { msg, .. } => StoreError::Corrupt {
                    kind: self.kind.to_string(),
                    id: hex::encode(id.as_slice()),
                    reason: msg,
                },
                other => StoreError::Std(other),
            })
    }

    pub fn has(&self, storage: &dyn Storage, id: &Binary) -> bool {
        self.records().has(storage, id.to_vec())
    }

    /// Removes the record and every index entry derived from it.
    pub fn delete(&self, storage: &mut dyn Storage, id: &Binary) -> Result<(), StoreError> {
        let old = self.get(storage, id)?;
        for index in &self.indexes {
            index.replace(storage, id, Some(&old), None)?;
        }
        self.records().remove(storage, id.to_vec());
        Ok(())
    }

    /// All ids whose derived key under index `name` equals `key`, ascending.
    pub fn list_by_index(
        &self,
        storage: &dyn Storage,
        name: &str,
        key: &[u8],
    ) -> Result<Vec<Binary>, StoreError> {
        self.index(name)?.ids(storage, key, None, None)
    }

    /// Like [`Bucket::list_by_index`], resuming after `start_after` and
    /// returning at most `limit` ids.
    pub fn page_by_index(
        &self,
        storage: &dyn Storage,
        name: &str,
        key: &[u8],
        start_after: Option<&Binary>,
        limit: usize,
    ) -> Result<Vec<Binary>, StoreError> {
        self.index(name)?.ids(storage, key, start_after, Some(limit))
    }
}
