// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Partitioned Storage
//!
//! Durable storage for tag triples and like counters, scoped by partition
//! hash. Target and tag values arrive here already encrypted and are treated
//! as opaque text; this layer never sees a key.
//!
//! ## Records
//!
//! | Record | Key | Value |
//! |--------|-----|-------|
//! | tag | `(partition, target, tag)` | – |
//! | like | `(partition, target)` | counter |
//!
//! Lookups are exact matches on the stored text. Callers that want to find a
//! target again must present the same envelope they stored.

pub mod tag_database;

pub use tag_database::TagDatabase;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Exact `(partition, target, tag)` triple is already stored.
    #[error("tag already recorded for this target")]
    Conflict,

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Everything except a primary-key conflict is a storage fault.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Partition-scoped tag and like storage.
///
/// Implementations must make `increment_like` atomic: concurrent increments
/// of one `(partition, target)` are never lost.
pub trait PartitionedStore: Send + Sync {
    /// Record a tag for a target. Fails with [`StoreError::Conflict`] if the
    /// exact triple exists.
    fn insert_tag(&self, partition: &str, target: &str, tag: &str) -> StoreResult<()>;

    /// All tags recorded for `target`, empty if none.
    fn list_tags(&self, partition: &str, target: &str) -> StoreResult<Vec<String>>;

    /// All targets carrying `tag`, empty if none.
    fn list_targets(&self, partition: &str, tag: &str) -> StoreResult<Vec<String>>;

    /// Create the counter at 1 or add 1. Returns the new count.
    fn increment_like(&self, partition: &str, target: &str) -> StoreResult<u64>;

    /// Stored counter, 0 when the target was never liked.
    fn get_like_count(&self, partition: &str, target: &str) -> StoreResult<u64>;

    /// Cheap read used by readiness probes.
    fn health_check(&self) -> StoreResult<()>;
}
