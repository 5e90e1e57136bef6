//! Load-time selection of switch and waking events.
//!
//! The host calls into this once per record, in trace order, while a stream
//! loads. Switch events are collected as-is. Waking events are collected
//! together with the pid of the task they wake; in direct mode that pid is
//! read from the raw record and the entry is moved onto the woken task's plot.

use crate::context::{NapDiagnostics, PluginContext};
use crate::trace::constants::NO_FIELD;
use crate::trace::{EntryId, RawRecord, TraceEntry};

/// What the classifier did with a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Switch,
    /// A waking event and the pid it was keyed by (`NO_FIELD` if unresolved).
    Waking(i64),
    Ignored,
}

/// Classify one record and collect it if it is a switch or waking event.
pub fn select_event(
    ctx: &mut PluginContext,
    rec: &RawRecord,
    id: EntryId,
    entry: &mut TraceEntry,
) -> Selection {
    if entry.event_id == ctx.sswitch_event_id {
        ctx.collected_events.append(id, entry.ts, NO_FIELD);
        Selection::Switch
    } else if entry.event_id == ctx.waking_event_id {
        let key = if ctx.couplebreak {
            // Target entries are already owned by the woken task. The pid is
            // still stored so later owner changes by others don't affect us.
            entry.pid as i64
        } else {
            process_waking(ctx, rec, entry)
        };
        ctx.collected_events.append(id, entry.ts, key);
        Selection::Waking(key)
    } else {
        Selection::Ignored
    }
}

/// Read the woken pid from a `sched_waking` record and make the entry belong
/// to that task, so it shows up on the sleeping task's plot.
fn process_waking(ctx: &PluginContext, rec: &RawRecord, entry: &mut TraceEntry) -> i64 {
    let woken = ctx
        .waking_pid_field
        .as_ref()
        .and_then(|field| rec.read_number(field));

    match woken {
        Some(pid) => {
            entry.pid = pid as i32;
            entry.visible.set_plugin_untouched(false);
            pid
        }
        None => {
            NapDiagnostics::bump(&ctx.diagnostics.unresolved_wakings);
            NO_FIELD
        }
    }
}
