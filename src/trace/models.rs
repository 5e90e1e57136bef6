//! Trace data model shared by the classifier, matcher and renderer.
//!
//! Entries are owned by the host's [`TraceStore`]. Everything in this crate
//! refers to them through [`EntryId`] handles and borrows the store when it
//! needs to look at an entry, so nothing here can outlive or free trace data.

use std::collections::HashMap;

use bitfield::bitfield;
use serde::Serialize;

bitfield! {
    /// Per-entry visibility bits, laid out the way the host filters them.
    ///
    /// A freshly loaded entry has every bit set. The classifier clears
    /// `plugin_untouched` on entries whose owner it reassigns.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct VisibleFlags(u8);
    impl Debug;
    pub text_view, set_text_view: 0;
    pub graph_view, set_graph_view: 1;
    pub event_view, set_event_view: 2;
    pub plugin_untouched, set_plugin_untouched: 7;
}

impl VisibleFlags {
    /// All filter bits set, the state of an entry straight out of the loader.
    pub fn all() -> Self {
        VisibleFlags(0xFF)
    }

    /// No bits set; the entry is filtered out everywhere.
    pub fn none() -> Self {
        VisibleFlags(0)
    }

    pub fn from_bits(bits: u8) -> Self {
        VisibleFlags(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Handle to an entry in a [`TraceStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

/// A single scheduler event as the host presents it.
///
/// # Fields
/// - `ts`: Timestamp in nanoseconds (trace clock)
/// - `event_id`: Numeric event kind, resolved per stream
/// - `pid`: Task that owns the entry; may be reassigned during classification
/// - `cpu`: CPU the event was recorded on
/// - `visible`: Filter bits, see [`VisibleFlags`]
/// - `info`: The host's rendered info string, e.g.
///   `prev_comm=a prev_pid=5 prev_prio=120 prev_state=S ==> next_comm=b`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub ts: u64,
    pub event_id: i32,
    pub pid: i32,
    pub cpu: i32,
    pub visible: VisibleFlags,
    pub info: String,
}

impl TraceEntry {
    pub fn new(ts: u64, event_id: i32, pid: i32) -> Self {
        Self {
            ts,
            event_id,
            pid,
            cpu: 0,
            visible: VisibleFlags::all(),
            info: String::new(),
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_cpu(mut self, cpu: i32) -> Self {
        self.cpu = cpu;
        self
    }

    /// Returns true if the entry passes both the event filter and the graph
    /// filter, i.e. it is actually drawn in the plot.
    pub fn is_visible_in_graph(&self) -> bool {
        self.visible.event_view() && self.visible.graph_view()
    }
}

/// Host-side storage of loaded entries, in trace order.
#[derive(Debug, Default)]
pub struct TraceStore {
    entries: Vec<TraceEntry>,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) -> EntryId {
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }

    pub fn get(&self, id: EntryId) -> Option<&TraceEntry> {
        self.entries.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut TraceEntry> {
        self.entries.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &TraceEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }
}

/// Describes one named field of an event's raw payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub event_id: i32,
    pub name: String,
}

/// The undecoded record handed to the ingestion callback.
///
/// Only integer fields are modelled; that is all classification reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, i64>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: i64) {
        self.fields.insert(name.into(), value);
    }

    /// Reads an integer field. Returns `None` if the record does not carry it.
    pub fn read_number(&self, field: &FieldDescriptor) -> Option<i64> {
        self.fields.get(&field.name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_fully_visible() {
        let entry = TraceEntry::new(10, 1, 5);
        assert!(entry.is_visible_in_graph());
        assert!(entry.visible.plugin_untouched());
        assert_eq!(entry.visible.bits(), 0xFF);
    }

    #[test]
    fn test_visibility_requires_both_filters() {
        let mut entry = TraceEntry::new(10, 1, 5);
        entry.visible.set_graph_view(false);
        assert!(!entry.is_visible_in_graph());

        entry.visible.set_graph_view(true);
        entry.visible.set_event_view(false);
        assert!(!entry.is_visible_in_graph());

        // The text view bit plays no part in graph visibility.
        entry.visible.set_event_view(true);
        entry.visible.set_text_view(false);
        assert!(entry.is_visible_in_graph());
    }

    #[test]
    fn test_clearing_untouched_keeps_other_bits() {
        let mut flags = VisibleFlags::all();
        flags.set_plugin_untouched(false);
        assert_eq!(flags.bits(), 0x7F);
        assert!(flags.event_view());
    }

    #[test]
    fn test_store_handles_are_sequential() {
        let mut store = TraceStore::new();
        let a = store.push(TraceEntry::new(1, 1, 1));
        let b = store.push(TraceEntry::new(2, 1, 1));
        assert_eq!(a, EntryId(0));
        assert_eq!(b, EntryId(1));
        assert_eq!(store.len(), 2);
        assert!(store.get(EntryId(2)).is_none());
    }

    #[test]
    fn test_raw_record_missing_field() {
        let rec = RawRecord::new().with_field("pid", 42);
        let pid = FieldDescriptor {
            event_id: 3,
            name: "pid".to_string(),
        };
        let prio = FieldDescriptor {
            event_id: 3,
            name: "prio".to_string(),
        };
        assert_eq!(rec.read_number(&pid), Some(42));
        assert_eq!(rec.read_number(&prio), None);
    }
}
