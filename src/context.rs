//! Per-stream plugin state.
//!
//! Each stream the plugin is loaded for gets one [`PluginContext`], created
//! by [`ContextRegistry::init`] and dropped by [`ContextRegistry::close`].
//! The registry is the only place contexts are created, looked up or
//! destroyed.
//!
//! # Thread Safety
//!
//! Contexts live in a `DashMap`, so once loading is done any number of draw
//! calls can read them concurrently. Classification takes a write guard on a
//! single stream's shard only.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::{Ref, RefMut};
use dashmap::DashMap;

use crate::error::NapError;
use crate::record::EventCollector;
use crate::stream::DataStream;
use crate::trace::constants::{
    COUPLEBREAK_SWT_ID, SCHED_SWITCH_EVENT, SCHED_WAKING_EVENT, WAKING_PID_FIELD,
};
use crate::trace::FieldDescriptor;

/// Counters for records and naps that had to be degraded.
#[derive(Debug, Default)]
pub struct NapDiagnostics {
    /// Waking records whose woken pid could not be read.
    pub unresolved_wakings: AtomicU64,
    /// Switch entries whose info lacked the prev_state marker.
    pub malformed_info: AtomicU64,
    /// Switch entries with a prev_state code outside the known table.
    pub unmapped_states: AtomicU64,
}

impl NapDiagnostics {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unresolved_wakings(&self) -> u64 {
        self.unresolved_wakings.load(Ordering::Relaxed)
    }

    pub fn malformed_info(&self) -> u64 {
        self.malformed_info.load(Ordering::Relaxed)
    }

    pub fn unmapped_states(&self) -> u64 {
        self.unmapped_states.load(Ordering::Relaxed)
    }
}

/// State the plugin keeps for one stream.
#[derive(Debug)]
pub struct PluginContext {
    /// Switch and waking events selected during load.
    pub collected_events: EventCollector,
    /// Numeric id of `sched/sched_switch`.
    pub sswitch_event_id: i32,
    /// Numeric id of the waking events to pair with: `sched/sched_waking`, or
    /// the synthetic target id in coupled mode.
    pub waking_event_id: i32,
    /// Whether coupled mode was on when the context was created.
    pub couplebreak: bool,
    /// The `pid` field of `sched/sched_waking`. Only used in direct mode.
    pub waking_pid_field: Option<FieldDescriptor>,
    pub diagnostics: NapDiagnostics,
}

impl PluginContext {
    /// Resolve everything the plugin needs from a stream.
    pub fn for_stream(stream: &DataStream) -> Result<Self, NapError> {
        let stream_id = stream.stream_id;
        if !stream.is_tep() {
            return Err(NapError::NotTepStream { stream_id });
        }

        let sswitch_event_id =
            stream
                .find_event_id(SCHED_SWITCH_EVENT)
                .ok_or_else(|| NapError::MissingEvent {
                    stream_id,
                    event: SCHED_SWITCH_EVENT.to_string(),
                })?;

        let (waking_event_id, waking_pid_field) = if stream.couplebreak_on {
            (COUPLEBREAK_SWT_ID, None)
        } else {
            let waking_id =
                stream
                    .find_event_id(SCHED_WAKING_EVENT)
                    .ok_or_else(|| NapError::MissingEvent {
                        stream_id,
                        event: SCHED_WAKING_EVENT.to_string(),
                    })?;
            let field = stream.find_field(waking_id, WAKING_PID_FIELD);
            if field.is_none() {
                tracing::warn!(
                    "stream {}: {} has no '{}' field, wakings cannot be paired",
                    stream_id,
                    SCHED_WAKING_EVENT,
                    WAKING_PID_FIELD
                );
            }
            (waking_id, field)
        };

        Ok(Self {
            collected_events: EventCollector::new(),
            sswitch_event_id,
            waking_event_id,
            couplebreak: stream.couplebreak_on,
            waking_pid_field,
            diagnostics: NapDiagnostics::default(),
        })
    }
}

/// Owner of all plugin contexts, keyed by stream id.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: DashMap<i32, PluginContext>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the context for a stream. On failure nothing is left registered.
    pub fn init(&self, stream: &DataStream) -> Result<(), NapError> {
        let stream_id = stream.stream_id;
        match self.contexts.entry(stream_id) {
            Entry::Occupied(_) => Err(NapError::ContextExists { stream_id }),
            Entry::Vacant(slot) => {
                slot.insert(PluginContext::for_stream(stream)?);
                Ok(())
            }
        }
    }

    /// Drop the context for a stream, returning it if there was one.
    pub fn close(&self, stream_id: i32) -> Option<PluginContext> {
        self.contexts.remove(&stream_id).map(|(_, ctx)| ctx)
    }

    pub fn get(&self, stream_id: i32) -> Option<Ref<'_, i32, PluginContext>> {
        self.contexts.get(&stream_id)
    }

    pub fn get_mut(&self, stream_id: i32) -> Option<RefMut<'_, i32, PluginContext>> {
        self.contexts.get_mut(&stream_id)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamFormat;

    fn sched_stream(stream_id: i32) -> DataStream {
        let mut stream = DataStream::new(stream_id, StreamFormat::Tep);
        stream.add_event(SCHED_SWITCH_EVENT, 316, &["prev_pid", "prev_state"]);
        stream.add_event(SCHED_WAKING_EVENT, 319, &["comm", "pid", "prio"]);
        stream
    }

    #[test]
    fn test_direct_mode_ids() {
        let ctx = PluginContext::for_stream(&sched_stream(0)).unwrap();
        assert_eq!(ctx.sswitch_event_id, 316);
        assert_eq!(ctx.waking_event_id, 319);
        assert!(!ctx.couplebreak);
        assert_eq!(ctx.waking_pid_field.unwrap().name, "pid");
    }

    #[test]
    fn test_coupled_mode_uses_synthetic_id() {
        let stream = sched_stream(0).with_couplebreak(true);
        let ctx = PluginContext::for_stream(&stream).unwrap();
        assert_eq!(ctx.waking_event_id, COUPLEBREAK_SWT_ID);
        assert!(ctx.couplebreak);
        assert!(ctx.waking_pid_field.is_none());
    }

    #[test]
    fn test_missing_pid_field_is_not_fatal() {
        let mut stream = DataStream::new(0, StreamFormat::Tep);
        stream.add_event(SCHED_SWITCH_EVENT, 316, &[]);
        stream.add_event(SCHED_WAKING_EVENT, 319, &["comm"]);
        let ctx = PluginContext::for_stream(&stream).unwrap();
        assert!(ctx.waking_pid_field.is_none());
    }

    #[test]
    fn test_init_failures_leave_nothing_behind() {
        let registry = ContextRegistry::new();

        let other = DataStream::new(1, StreamFormat::Other);
        assert_eq!(
            registry.init(&other),
            Err(NapError::NotTepStream { stream_id: 1 })
        );

        let mut no_switch = DataStream::new(2, StreamFormat::Tep);
        no_switch.add_event(SCHED_WAKING_EVENT, 319, &["pid"]);
        assert!(matches!(
            registry.init(&no_switch),
            Err(NapError::MissingEvent { stream_id: 2, .. })
        ));

        let mut no_waking = DataStream::new(3, StreamFormat::Tep);
        no_waking.add_event(SCHED_SWITCH_EVENT, 316, &[]);
        assert!(registry.init(&no_waking).is_err());

        assert!(registry.is_empty());
    }

    #[test]
    fn test_init_twice_and_close() {
        let registry = ContextRegistry::new();
        let stream = sched_stream(4);
        registry.init(&stream).unwrap();
        assert_eq!(
            registry.init(&stream),
            Err(NapError::ContextExists { stream_id: 4 })
        );
        assert_eq!(registry.len(), 1);

        assert!(registry.close(4).is_some());
        assert!(registry.close(4).is_none());
        assert!(registry.get(4).is_none());
    }

    #[test]
    fn test_concurrent_init_registers_once() {
        let registry = ContextRegistry::new();
        let stream = sched_stream(5);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.init(&stream)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == NapError::ContextExists { stream_id: 5 }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_init_leaves_slot_free() {
        let registry = ContextRegistry::new();
        let mut stream = DataStream::new(6, StreamFormat::Tep);
        stream.add_event(SCHED_WAKING_EVENT, 319, &["pid"]);
        assert!(registry.init(&stream).is_err());
        assert!(registry.get(6).is_none());

        stream.add_event(SCHED_SWITCH_EVENT, 316, &[]);
        registry.init(&stream).unwrap();
        assert_eq!(registry.get(6).unwrap().sswitch_event_id, 316);
    }

    #[test]
    fn test_diagnostics_counters() {
        let diag = NapDiagnostics::default();
        NapDiagnostics::bump(&diag.unmapped_states);
        NapDiagnostics::bump(&diag.unmapped_states);
        NapDiagnostics::bump(&diag.malformed_info);
        assert_eq!(diag.unmapped_states(), 2);
        assert_eq!(diag.malformed_info(), 1);
        assert_eq!(diag.unresolved_wakings(), 0);
    }
}
