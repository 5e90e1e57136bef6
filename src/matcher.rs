//! Pairing of switch events with the wake-up that ends the nap.
//!
//! Given the collector of one stream and the visible window, the matcher
//! walks the collected records in timestamp order. Each switch-out of the target
//! task is paired with the first waking record for that task that follows it.
//! The scan then resumes after the consumed waking record, so no entry ends
//! up in more than one pair and switch-outs that happen inside an open nap
//! are not paired at all.
//!
//! Only records inside the window's time range are looked at, which keeps a
//! redraw proportional to what is on screen rather than to the whole trace.

use crate::histo::Histogram;
use crate::record::{CollectedRecord, EventCollector};
use crate::trace::{EntryId, TraceEntry, TraceStore};

/// A switch/waking pair and the bins both ends fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NapMatch {
    pub switch: EntryId,
    pub waking: EntryId,
    pub start_bin: usize,
    pub end_bin: usize,
}

/// Scan `collector` for `(start, end)` pairs inside the visible window.
///
/// `is_start` and `is_end` select the records that may open and close an
/// interval. Pairs are returned in ascending order of their start record.
pub fn interval_pairs<A, B>(
    collector: &EventCollector,
    store: &TraceStore,
    histo: &Histogram,
    is_start: A,
    is_end: B,
) -> Vec<NapMatch>
where
    A: Fn(&CollectedRecord, &TraceEntry) -> bool,
    B: Fn(&CollectedRecord, &TraceEntry) -> bool,
{
    let records = collector.records();
    let mut pairs = Vec::new();
    let mut index = collector.first_at_or_after(histo.min());

    while index < records.len() {
        let start_rec = &records[index];
        let Some(start) = store.get(start_rec.entry) else {
            index += 1;
            continue;
        };
        if start.ts > histo.max() {
            break;
        }
        if !is_start(start_rec, start) {
            index += 1;
            continue;
        }

        // The end of the interval is the first applicable record strictly
        // after the start. If there is none in the window, no later start
        // can have one either.
        let Some((end_index, end)) = find_end(records, store, histo, index + 1, &is_end) else {
            break;
        };

        if let (Some(start_bin), Some(end_bin)) = (histo.bin_of(start.ts), histo.bin_of(end.ts)) {
            pairs.push(NapMatch {
                switch: start_rec.entry,
                waking: records[end_index].entry,
                start_bin,
                end_bin,
            });
        }

        index = end_index + 1;
    }

    pairs
}

fn find_end<'s, B>(
    records: &[CollectedRecord],
    store: &'s TraceStore,
    histo: &Histogram,
    from: usize,
    is_end: &B,
) -> Option<(usize, &'s TraceEntry)>
where
    B: Fn(&CollectedRecord, &TraceEntry) -> bool,
{
    for (offset, rec) in records[from..].iter().enumerate() {
        let Some(entry) = store.get(rec.entry) else {
            continue;
        };
        if entry.ts > histo.max() {
            return None;
        }
        if is_end(rec, entry) {
            return Some((from + offset, entry));
        }
    }
    None
}

/// Finds the naps of one task within a visible window.
#[derive(Clone, Copy, Debug)]
pub struct NapMatcher<'a> {
    collector: &'a EventCollector,
    store: &'a TraceStore,
    sswitch_event_id: i32,
    waking_event_id: i32,
}

impl<'a> NapMatcher<'a> {
    pub fn new(
        collector: &'a EventCollector,
        store: &'a TraceStore,
        sswitch_event_id: i32,
        waking_event_id: i32,
    ) -> Self {
        Self {
            collector,
            store,
            sswitch_event_id,
            waking_event_id,
        }
    }

    /// A visible switch-out of task `pid`.
    pub fn is_switch_candidate(&self, entry: &TraceEntry, pid: i32) -> bool {
        entry.is_visible_in_graph() && entry.event_id == self.sswitch_event_id && entry.pid == pid
    }

    /// A visible waking record keyed by task `pid`.
    pub fn is_waking_candidate(&self, rec: &CollectedRecord, entry: &TraceEntry, pid: i32) -> bool {
        entry.is_visible_in_graph()
            && entry.event_id == self.waking_event_id
            && rec.field == pid as i64
    }

    /// All naps of task `pid` visible in `histo`, in trace order.
    pub fn find_naps(&self, histo: &Histogram, pid: i32) -> Vec<NapMatch> {
        interval_pairs(
            self.collector,
            self.store,
            histo,
            |_, entry| self.is_switch_candidate(entry, pid),
            |rec, entry| self.is_waking_candidate(rec, entry, pid),
        )
    }
}
