// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded tag database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `targets_tags`: key (partition, target, tag) → ()
//! - `tags_targets`: key (partition, tag, target) → ()
//! - `likes`: key (partition, target) → u64 counter
//!
//! Keys are built from length-prefixed segments so that arbitrary text in one
//! segment can never bleed into the next. A `(partition, target)` prefix range
//! scan lists every tag of a target; the mirrored table serves the reverse
//! lookup. Both tag tables are written in the same transaction.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{PartitionedStore, StoreError, StoreResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: (partition, target, tag) → ().
const TARGETS_TAGS: TableDefinition<&[u8], ()> = TableDefinition::new("targets_tags");

/// Reverse index: (partition, tag, target) → ().
const TAGS_TARGETS: TableDefinition<&[u8], ()> = TableDefinition::new("tags_targets");

/// Like counters: (partition, target) → count.
const LIKES: TableDefinition<&[u8], u64> = TableDefinition::new("likes");

// =============================================================================
// Key Helpers
// =============================================================================

fn push_segment(key: &mut Vec<u8>, segment: &str) {
    key.extend_from_slice(&(segment.len() as u32).to_be_bytes());
    key.extend_from_slice(segment.as_bytes());
}

/// Composite key: each segment is `u32 length (BE) || bytes`.
fn make_key(segments: &[&str]) -> Vec<u8> {
    let len = segments.iter().map(|s| 4 + s.len()).sum();
    let mut key = Vec::with_capacity(len);
    for segment in segments {
        push_segment(&mut key, segment);
    }
    key
}

/// Exclusive upper bound for every key that extends `prefix` by one segment.
///
/// A following segment starts with its length, which is always below
/// `0xFFFF_FFFF`.
fn make_prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = Vec::with_capacity(prefix.len() + 4);
    end.extend_from_slice(prefix);
    end.extend_from_slice(&[0xFF; 4]);
    end
}

/// Read back the segment that follows `prefix` in a full key.
fn trailing_segment(key: &[u8], prefix_len: usize) -> Option<String> {
    let rest = key.get(prefix_len..)?;
    let len_bytes: [u8; 4] = rest.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let bytes = rest.get(4..4 + len)?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

// =============================================================================
// TagDatabase
// =============================================================================

/// redb-backed [`PartitionedStore`].
pub struct TagDatabase {
    db: Database,
}

impl TagDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;
        tracing::info!(path = %path.display(), "Opened tag database");
        Self::with_database(db)
    }

    /// Volatile database, lost on drop.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> StoreResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TARGETS_TAGS)?;
            let _ = write_txn.open_table(TAGS_TARGETS)?;
            let _ = write_txn.open_table(LIKES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn scan_trailing(
        &self,
        table_def: TableDefinition<&[u8], ()>,
        partition: &str,
        lead: &str,
    ) -> StoreResult<Vec<String>> {
        let prefix = make_key(&[partition, lead]);
        let prefix_end = make_prefix_end(&prefix);

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;

        let mut values = Vec::new();
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let (key, _) = entry?;
            if let Some(value) = trailing_segment(key.value(), prefix.len()) {
                values.push(value);
            }
        }
        Ok(values)
    }
}

impl PartitionedStore for TagDatabase {
    fn insert_tag(&self, partition: &str, target: &str, tag: &str) -> StoreResult<()> {
        let forward = make_key(&[partition, target, tag]);
        let reverse = make_key(&[partition, tag, target]);

        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut forward_table = write_txn.open_table(TARGETS_TAGS)?;
            if forward_table.get(forward.as_slice())?.is_some() {
                false
            } else {
                forward_table.insert(forward.as_slice(), ())?;
                let mut reverse_table = write_txn.open_table(TAGS_TARGETS)?;
                reverse_table.insert(reverse.as_slice(), ())?;
                true
            }
        };

        if !inserted {
            write_txn.abort()?;
            return Err(StoreError::Conflict);
        }

        write_txn.commit()?;
        tracing::debug!(partition, "Recorded tag");
        Ok(())
    }

    fn list_tags(&self, partition: &str, target: &str) -> StoreResult<Vec<String>> {
        self.scan_trailing(TARGETS_TAGS, partition, target)
    }

    fn list_targets(&self, partition: &str, tag: &str) -> StoreResult<Vec<String>> {
        self.scan_trailing(TAGS_TARGETS, partition, tag)
    }

    fn increment_like(&self, partition: &str, target: &str) -> StoreResult<u64> {
        let key = make_key(&[partition, target]);

        // redb admits one write transaction at a time, so the read and the
        // write below cannot interleave with another increment.
        let write_txn = self.db.begin_write()?;
        let count = {
            let mut table = write_txn.open_table(LIKES)?;
            let current = table
                .get(key.as_slice())?
                .map(|value| value.value())
                .unwrap_or(0);
            let next = current.saturating_add(1);
            table.insert(key.as_slice(), next)?;
            next
        };
        write_txn.commit()?;

        tracing::debug!(partition, count, "Incremented like counter");
        Ok(count)
    }

    fn get_like_count(&self, partition: &str, target: &str) -> StoreResult<u64> {
        let key = make_key(&[partition, target]);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIKES)?;
        match table.get(key.as_slice())? {
            Some(value) => Ok(value.value()),
            None => Ok(0),
        }
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(LIKES)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    const P1: &str = "partition-one";
    const P2: &str = "partition-two";

    fn sorted(mut values: Vec<String>) -> Vec<String> {
        values.sort();
        values
    }

    #[test]
    fn insert_then_list_both_directions() {
        let db = TagDatabase::in_memory().unwrap();
        db.insert_tag(P1, "target-a", "tag-x").unwrap();
        db.insert_tag(P1, "target-a", "tag-y").unwrap();
        db.insert_tag(P1, "target-b", "tag-x").unwrap();

        assert_eq!(
            sorted(db.list_tags(P1, "target-a").unwrap()),
            vec!["tag-x", "tag-y"]
        );
        assert_eq!(db.list_tags(P1, "target-b").unwrap(), vec!["tag-x"]);
        assert_eq!(
            sorted(db.list_targets(P1, "tag-x").unwrap()),
            vec!["target-a", "target-b"]
        );
        assert_eq!(db.list_targets(P1, "tag-y").unwrap(), vec!["target-a"]);
    }

    #[test]
    fn duplicate_triple_is_a_conflict() {
        let db = TagDatabase::in_memory().unwrap();
        db.insert_tag(P1, "target-a", "tag-x").unwrap();
        let err = db.insert_tag(P1, "target-a", "tag-x").unwrap_err();
        assert!(err.is_conflict());

        // The failed insert left exactly one record behind
        assert_eq!(db.list_tags(P1, "target-a").unwrap(), vec!["tag-x"]);
        assert_eq!(db.list_targets(P1, "tag-x").unwrap(), vec!["target-a"]);

        // Same pair under another partition is a different record
        db.insert_tag(P2, "target-a", "tag-x").unwrap();
    }

    #[test]
    fn unknown_keys_return_empty_and_zero() {
        let db = TagDatabase::in_memory().unwrap();
        assert!(db.list_tags(P1, "nothing").unwrap().is_empty());
        assert!(db.list_targets(P1, "nothing").unwrap().is_empty());
        assert_eq!(db.get_like_count(P1, "nothing").unwrap(), 0);
    }

    #[test]
    fn partitions_are_isolated() {
        let db = TagDatabase::in_memory().unwrap();
        db.insert_tag(P1, "shared-target", "p1-tag").unwrap();
        db.insert_tag(P2, "shared-target", "p2-tag").unwrap();
        db.increment_like(P1, "shared-target").unwrap();

        assert_eq!(db.list_tags(P1, "shared-target").unwrap(), vec!["p1-tag"]);
        assert_eq!(db.list_tags(P2, "shared-target").unwrap(), vec!["p2-tag"]);
        assert!(db.list_targets(P1, "p2-tag").unwrap().is_empty());
        assert_eq!(db.get_like_count(P2, "shared-target").unwrap(), 0);
    }

    #[test]
    fn prefix_targets_do_not_bleed() {
        let db = TagDatabase::in_memory().unwrap();
        db.insert_tag(P1, "ab", "short").unwrap();
        db.insert_tag(P1, "abc", "long").unwrap();
        db.insert_tag(P1, "a|b", "pipe").unwrap();

        assert_eq!(db.list_tags(P1, "ab").unwrap(), vec!["short"]);
        assert_eq!(db.list_tags(P1, "abc").unwrap(), vec!["long"]);
        assert_eq!(db.list_tags(P1, "a|b").unwrap(), vec!["pipe"]);
        assert!(db.list_tags(P1, "a").unwrap().is_empty());
    }

    #[test]
    fn increment_creates_then_adds() {
        let db = TagDatabase::in_memory().unwrap();
        assert_eq!(db.increment_like(P1, "target").unwrap(), 1);
        assert_eq!(db.increment_like(P1, "target").unwrap(), 2);
        assert_eq!(db.increment_like(P1, "target").unwrap(), 3);
        assert_eq!(db.get_like_count(P1, "target").unwrap(), 3);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let db = Arc::new(TagDatabase::in_memory().unwrap());
        let workers = 16;
        let per_worker = 25;

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for _ in 0..per_worker {
                        db.increment_like(P1, "hot-target").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            db.get_like_count(P1, "hot-target").unwrap(),
            (workers * per_worker) as u64
        );
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tags.redb");

        {
            let db = TagDatabase::open(&path).unwrap();
            db.insert_tag(P1, "target", "tag").unwrap();
            db.increment_like(P1, "target").unwrap();
        }

        let db = TagDatabase::open(&path).unwrap();
        assert_eq!(db.list_tags(P1, "target").unwrap(), vec!["tag"]);
        assert_eq!(db.get_like_count(P1, "target").unwrap(), 1);
        db.health_check().unwrap();
    }

    #[test]
    fn trailing_segment_rejects_truncated_keys() {
        let prefix = make_key(&[P1, "t"]);
        assert_eq!(trailing_segment(&prefix, prefix.len()), None);

        let mut key = prefix.clone();
        key.extend_from_slice(&10u32.to_be_bytes());
        key.extend_from_slice(b"short");
        assert_eq!(trailing_segment(&key, prefix.len()), None);
    }
}
