//! Store of the events selected during load, ordered by timestamp.
//!
//! The host may hand records over in any order. Each record is placed after
//! every record with the same or an earlier timestamp, so records with equal
//! timestamps keep the order they arrived in. Nothing is ever removed; the
//! whole collector goes away with its plugin context when the stream is
//! closed.

use std::ops::Index;

use crate::trace::EntryId;

/// One selected event: a handle to the host's entry, the entry's timestamp
/// and an auxiliary value.
///
/// For switch events `field` is [`crate::trace::constants::NO_FIELD`]. For
/// waking events it is the pid of the woken task, or `NO_FIELD` if that could
/// not be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectedRecord {
    pub entry: EntryId,
    pub ts: u64,
    pub field: i64,
}

#[derive(Debug, Default)]
pub struct EventCollector {
    records: Vec<CollectedRecord>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, keeping the collector sorted by `ts`.
    ///
    /// In-order arrival is a plain push.
    pub fn append(&mut self, entry: EntryId, ts: u64, field: i64) {
        let rec = CollectedRecord { entry, ts, field };
        match self.records.last() {
            Some(last) if last.ts > ts => {
                let at = self.records.partition_point(|r| r.ts <= ts);
                self.records.insert(at, rec);
            }
            _ => self.records.push(rec),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CollectedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectedRecord> {
        self.records.iter()
    }

    /// Index of the first record with `ts >= min_ts`.
    pub fn first_at_or_after(&self, min_ts: u64) -> usize {
        self.records.partition_point(|rec| rec.ts < min_ts)
    }
}

impl Index<usize> for EventCollector {
    type Output = CollectedRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}
