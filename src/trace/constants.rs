//! Shared constants for trace processing.

/// Event name of the context switch tracepoint.
pub const SCHED_SWITCH_EVENT: &str = "sched/sched_switch";

/// Event name of the waking tracepoint.
pub const SCHED_WAKING_EVENT: &str = "sched/sched_waking";

/// Field of `sched_waking` that holds the pid of the woken task.
pub const WAKING_PID_FIELD: &str = "pid";

/// Event id the host reserves for the synthetic `couplebreak/sched_waking[target]`
/// entries it creates when coupled mode is on for a stream. Those entries are
/// already owned by the woken task.
pub const COUPLEBREAK_SWT_ID: i32 = -12;

/// Auxiliary field value for collected records that carry no task id.
/// Target ids are never negative, so this can never satisfy a match.
pub const NO_FIELD: i64 = -1;

/// Font size used for nap labels; label width is estimated from it.
pub const FONT_SIZE: i32 = 7;

/// Height of a nap rectangle in pixels.
pub const NAP_HEIGHT: i32 = 8;

/// Vertical offset of a nap rectangle from the plot's base line.
pub const NAP_HEIGHT_OFFSET: i32 = -10;

/// Default for the visible entry count above which naps are not drawn.
pub const DEFAULT_HISTO_ENTRIES_LIMIT: usize = 10_000;
