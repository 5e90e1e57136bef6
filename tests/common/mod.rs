//! Common test utilities for naps integration tests.

use serde_json::{json, Map, Value};

use naps::histo::{Graph, Histogram};
use naps::loader::{LoadedTrace, TraceFile, COUPLEBREAK_SWT_EVENT};
use naps::render::ShapeList;
use naps::trace::constants::{SCHED_SWITCH_EVENT, SCHED_WAKING_EVENT};
use naps::{DrawAction, DrawArgs, NapRectangle, NapsPlugin, StreamPlugin};

pub const SWITCH_ID: i32 = 316;
pub const WAKING_ID: i32 = 319;
pub const WAKEUP_ID: i32 = 320;

/// Window and plot used by most tests: 10 bins of 100ns over `[0, 999]`,
/// 100 pixels apart.
pub const WINDOW: (u64, u64) = (0, 999);
pub const N_BINS: usize = 10;
pub const WIDTH: i32 = 1000;

/// Builds JSON trace fixtures in the format the loader reads.
pub struct TraceBuilder {
    couplebreak: bool,
    records: Vec<Value>,
    task_colors: Map<String, Value>,
}

#[allow(dead_code)]
impl TraceBuilder {
    pub fn direct() -> Self {
        Self {
            couplebreak: false,
            records: Vec::new(),
            task_colors: Map::new(),
        }
    }

    pub fn coupled() -> Self {
        Self {
            couplebreak: true,
            ..Self::direct()
        }
    }

    /// Task `pid` is switched out in state `state`.
    pub fn switch(self, ts: u64, pid: i32, state: &str) -> Self {
        let info = format!(
            "prev_comm=task{pid} prev_pid={pid} prev_prio=120 prev_state={state} ==> next_comm=swapper/0 next_pid=0 next_prio=120"
        );
        self.switch_with_info(ts, pid, &info)
    }

    pub fn switch_with_info(self, ts: u64, pid: i32, info: &str) -> Self {
        self.record(json!({
            "ts": ts,
            "event": SCHED_SWITCH_EVENT,
            "pid": pid,
            "info": info,
        }))
    }

    /// Task `waker` wakes task `woken`. In coupled mode the host's synthetic
    /// target entry follows the original record.
    pub fn waking(self, ts: u64, waker: i32, woken: i32) -> Self {
        let coupled = self.couplebreak;
        let this = self.record(json!({
            "ts": ts,
            "event": SCHED_WAKING_EVENT,
            "pid": waker,
            "info": format!("comm=task{woken} pid={woken} prio=120 target_cpu=001"),
            "fields": { "pid": woken },
        }));
        if coupled {
            this.record(json!({
                "ts": ts,
                "event": COUPLEBREAK_SWT_EVENT,
                "pid": woken,
            }))
        } else {
            this
        }
    }

    pub fn record(mut self, record: Value) -> Self {
        self.records.push(record);
        self
    }

    pub fn task_color(mut self, pid: i32, rgb: [u8; 3]) -> Self {
        self.task_colors.insert(pid.to_string(), json!(rgb));
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "stream_id": 0,
            "couplebreak": self.couplebreak,
            "events": [
                { "name": SCHED_SWITCH_EVENT, "id": SWITCH_ID, "fields": ["prev_state"] },
                { "name": SCHED_WAKING_EVENT, "id": WAKING_ID, "fields": ["pid"] },
                { "name": "sched/sched_wakeup", "id": WAKEUP_ID, "fields": ["pid"] },
            ],
            "task_colors": self.task_colors,
            "records": self.records,
        })
        .to_string()
    }

    pub fn load(&self, plugin: &NapsPlugin) -> LoadedTrace {
        TraceFile::from_json(&self.to_json())
            .expect("Failed to parse fixture")
            .ingest(plugin)
            .expect("Failed to load fixture")
    }
}

/// Histogram and plot row for the default window.
#[allow(dead_code)]
pub fn default_window(trace: &LoadedTrace) -> (Histogram, Graph) {
    let histo = Histogram::from_store(&trace.store, WINDOW.0, WINDOW.1, N_BINS);
    let graph = Graph::row(N_BINS, WIDTH, 40);
    (histo, graph)
}

/// Run one draw pass for the task plot of `pid`.
#[allow(dead_code)]
pub fn draw_task(plugin: &NapsPlugin, trace: &LoadedTrace, pid: i32) -> ShapeList {
    let (histo, graph) = default_window(trace);
    let args = DrawArgs {
        store: &trace.store,
        histo: &histo,
        graph: &graph,
        task_colors: &trace.task_colors,
    };
    let mut surface = ShapeList::new();
    plugin.draw(&args, trace.stream.stream_id, pid, DrawAction::Task, &mut surface);
    surface
}

/// The naps a draw pass for `pid` would produce.
#[allow(dead_code)]
pub fn naps_for(plugin: &NapsPlugin, trace: &LoadedTrace, pid: i32) -> Vec<NapRectangle> {
    let (histo, graph) = default_window(trace);
    let args = DrawArgs {
        store: &trace.store,
        histo: &histo,
        graph: &graph,
        task_colors: &trace.task_colors,
    };
    plugin.collect_naps(&args, trace.stream.stream_id, pid)
}

/// `(switch ts, waking ts)` of each nap.
#[allow(dead_code)]
pub fn nap_times(trace: &LoadedTrace, naps: &[NapRectangle]) -> Vec<(u64, u64)> {
    naps.iter()
        .map(|nap| {
            let start = trace.store.get(nap.start_entry).expect("dangling switch");
            let end = trace.store.get(nap.end_entry).expect("dangling waking");
            (start.ts, end.ts)
        })
        .collect()
}
