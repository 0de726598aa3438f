//! Durable storage of subscriptions in a single redb file.
//!
//! Records live in the `subscriptions` table keyed by their sequence id and
//! encoded as JSON. The last issued id is kept in the `sequences` table, so ids
//! are never handed out twice even after the record holding one is deleted.
//!
//! redb allows a single write transaction at a time and any number of readers,
//! each of which sees the snapshot that was current when it began.

use crate::domain::{Subscription, SubscriptionId};
use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableTable, Table, TableDefinition,
    WriteTransaction,
};
use std::path::{Path, PathBuf};

const SUBSCRIPTIONS: TableDefinition<'static, u64, &'static [u8]> =
    TableDefinition::new("subscriptions");

const SEQUENCES: TableDefinition<'static, &'static str, u64> = TableDefinition::new("sequences");

const SUBSCRIPTIONS_SEQUENCE: &str = "subscriptions";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open the subscription store at `{}`", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: redb::Error,
    },
    #[error("Failed to commit a write transaction")]
    WriteFailure(#[source] redb::Error),
    #[error("Failed to access the subscription store")]
    Storage(#[source] redb::Error),
    #[error("Stored subscription {id} could not be decoded")]
    Corrupted {
        id: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("Subscription {id} could not be encoded")]
    Encoding {
        id: SubscriptionId,
        #[source]
        source: serde_json::Error,
    },
    #[error("The subscription id sequence is exhausted")]
    SequenceExhausted,
}

fn storage(e: impl Into<redb::Error>) -> StoreError {
    StoreError::Storage(e.into())
}

#[derive(Debug)]
pub struct Store {
    db: Database,
    path: PathBuf,
}

impl Store {
    /// Opens the store at `path`, creating the file and its tables if needed.
    /// Existing data is kept as is.
    #[tracing::instrument(name = "Opening subscription store", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source: redb::Error| StoreError::Unavailable {
            path: path.clone(),
            source,
        };

        let db = Database::create(&path).map_err(|e| unavailable(e.into()))?;

        let txn = db.begin_write().map_err(|e| unavailable(e.into()))?;
        create_tables(&txn).map_err(|e| unavailable(e.into()))?;
        txn.commit().map_err(|e| unavailable(e.into()))?;

        Ok(Self { db, path })
    }

    /// Runs `f` inside a single write transaction.
    ///
    /// The transaction is committed when `f` returns `Ok` and aborted otherwise, so
    /// ids taken with [`StoreWriter::next_id`] are only issued together with whatever
    /// else `f` wrote. Blocks while another write transaction is in flight.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreWriter<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let txn = self.db.begin_write().map_err(storage)?;

        let outcome = {
            let mut writer = StoreWriter {
                subscriptions: txn.open_table(SUBSCRIPTIONS).map_err(storage)?,
                sequences: txn.open_table(SEQUENCES).map_err(storage)?,
            };
            f(&mut writer)
        };

        match outcome {
            Ok(value) => {
                txn.commit()
                    .map_err(|e| StoreError::WriteFailure(e.into()))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_error) = txn.abort() {
                    tracing::warn!(
                        error.cause_chain = ?abort_error,
                        "Failed to abort a write transaction"
                    );
                }
                Err(e)
            }
        }
    }

    pub fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StoreError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(SUBSCRIPTIONS).map_err(storage)?;

        let stored = table.get(id.get()).map_err(storage)?;
        stored
            .map(|value| decode(id.get(), value.value()))
            .transpose()
    }

    /// Lazily walks every record in ascending id order.
    ///
    /// The scan reads from the snapshot taken when it starts; writes committed
    /// afterwards are not visible to it. Call again to restart.
    pub fn scan(&self) -> Result<Scan, StoreError> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(SUBSCRIPTIONS).map_err(storage)?;

        Ok(Scan {
            table,
            _txn: txn,
            cursor: Some(0),
        })
    }

    /// Drops every record and resets the id sequence.
    #[tracing::instrument(name = "Wiping subscription store", skip(self), fields(path = %self.path.display()))]
    pub fn wipe(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(storage)?;
        txn.delete_table(SUBSCRIPTIONS).map_err(storage)?;
        txn.delete_table(SEQUENCES).map_err(storage)?;
        create_tables(&txn).map_err(storage)?;
        txn.commit()
            .map_err(|e| StoreError::WriteFailure(e.into()))
    }

    /// Releases the store handle. Write transactions borrow the store and have
    /// finished by now; a [`Scan`] still alive keeps its snapshot readable until
    /// it is dropped.
    #[tracing::instrument(name = "Closing subscription store", skip(self), fields(path = %self.path.display()))]
    pub fn close(self) {
        drop(self.db);
    }
}

#[cfg(test)]
impl Store {
    /// Writes raw bytes under `id`, bypassing the encoding.
    pub(crate) fn put_raw(&self, id: u64, bytes: &[u8]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(storage)?;
        txn.open_table(SUBSCRIPTIONS)
            .map_err(storage)?
            .insert(id, bytes)
            .map_err(storage)?;
        txn.commit().map_err(|e| StoreError::WriteFailure(e.into()))
    }
}

fn create_tables(txn: &WriteTransaction) -> Result<(), redb::TableError> {
    txn.open_table(SUBSCRIPTIONS)?;
    txn.open_table(SEQUENCES)?;
    Ok(())
}

fn decode(id: u64, bytes: &[u8]) -> Result<Subscription, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupted { id, source })
}

/// Table access inside a write transaction opened by [`Store::update`].
pub struct StoreWriter<'txn> {
    subscriptions: Table<'txn, u64, &'static [u8]>,
    sequences: Table<'txn, &'static str, u64>,
}

impl StoreWriter<'_> {
    /// Advances the store-wide sequence and returns the new value. The first id is 1.
    pub fn next_id(&mut self) -> Result<SubscriptionId, StoreError> {
        let next = self
            .last_id()?
            .map_or(Some(1), |last| last.get().checked_add(1))
            .ok_or(StoreError::SequenceExhausted)?;

        self.sequences
            .insert(SUBSCRIPTIONS_SEQUENCE, next)
            .map_err(storage)?;

        Ok(SubscriptionId::new(next))
    }

    /// The most recently issued id, if any was ever issued.
    pub fn last_id(&self) -> Result<Option<SubscriptionId>, StoreError> {
        let last = self
            .sequences
            .get(SUBSCRIPTIONS_SEQUENCE)
            .map_err(storage)?
            .map(|value| SubscriptionId::new(value.value()));

        Ok(last)
    }

    /// Stores `subscription` under its id, replacing any previous value.
    pub fn put(&mut self, subscription: &Subscription) -> Result<(), StoreError> {
        let id = subscription.id;
        let bytes = serde_json::to_vec(subscription)
            .map_err(|source| StoreError::Encoding { id, source })?;

        self.subscriptions
            .insert(id.get(), bytes.as_slice())
            .map_err(storage)?;

        Ok(())
    }

    pub fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StoreError> {
        let stored = self.subscriptions.get(id.get()).map_err(storage)?;
        stored
            .map(|value| decode(id.get(), value.value()))
            .transpose()
    }

    /// Removes the record stored under `id`. Returns whether there was one.
    pub fn delete(&mut self, id: SubscriptionId) -> Result<bool, StoreError> {
        let removed = self.subscriptions.remove(id.get()).map_err(storage)?;
        Ok(removed.is_some())
    }
}

/// Iterator over a read snapshot, returned by [`Store::scan`].
pub struct Scan {
    table: ReadOnlyTable<u64, &'static [u8]>,
    _txn: ReadTransaction,
    cursor: Option<u64>,
}

impl Iterator for Scan {
    type Item = Result<Subscription, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.cursor?;

        let entry = match self.table.range(from..) {
            Ok(mut range) => range.next()?,
            Err(e) => {
                self.cursor = None;
                return Some(Err(storage(e)));
            }
        };

        let item = entry.map_err(storage).and_then(|(key, value)| {
            let id = key.value();
            self.cursor = id.checked_add(1);
            decode(id, value.value())
        });

        if item.is_err() {
            self.cursor = None;
        }

        Some(item)
    }
}
