//! Loading of JSON trace fixtures.
//!
//! This plays the host's part for the `naps` binary and the integration
//! tests: it builds the stream description and the entry store from a JSON
//! file and feeds every record through a plugin's `classify`, in trace order.
//!
//! ```json
//! {
//!   "stream_id": 0,
//!   "couplebreak": false,
//!   "events": [
//!     { "name": "sched/sched_switch", "id": 316, "fields": ["prev_state"] },
//!     { "name": "sched/sched_waking", "id": 319, "fields": ["pid"] }
//!   ],
//!   "task_colors": { "5": [200, 10, 10] },
//!   "records": [
//!     { "ts": 100, "event": "sched/sched_switch", "pid": 5,
//!       "info": "prev_comm=a prev_pid=5 prev_state=S ==> next_comm=b" },
//!     { "ts": 250, "event": "sched/sched_waking", "pid": 7, "fields": { "pid": 5 } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::plugin::StreamPlugin;
use crate::render::{Color, ColorTable};
use crate::stream::{DataStream, StreamFormat};
use crate::trace::constants::COUPLEBREAK_SWT_ID;
use crate::trace::{RawRecord, TraceEntry, TraceStore, VisibleFlags};

/// Name fixtures use for the host's synthetic coupled-mode waking entries.
pub const COUPLEBREAK_SWT_EVENT: &str = "couplebreak/sched_waking[target]";

#[derive(Debug, Deserialize)]
pub struct EventSpec {
    pub name: String,
    pub id: i32,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordSpec {
    pub ts: u64,
    pub event: String,
    pub pid: i32,
    #[serde(default)]
    pub cpu: i32,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub fields: HashMap<String, i64>,
    /// Visibility bits; all set when absent.
    #[serde(default)]
    pub visible: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct TraceFile {
    #[serde(default)]
    pub stream_id: i32,
    #[serde(default)]
    pub couplebreak: bool,
    #[serde(default = "default_tep")]
    pub tep: bool,
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub task_colors: HashMap<i32, [u8; 3]>,
    pub records: Vec<RecordSpec>,
}

fn default_tep() -> bool {
    true
}

/// A stream after loading: the host-side data the plugin borrows when drawing.
#[derive(Debug)]
pub struct LoadedTrace {
    pub stream: DataStream,
    pub store: TraceStore,
    pub task_colors: ColorTable,
}

impl LoadedTrace {
    /// Time range covered by the loaded entries.
    pub fn time_range(&self) -> Option<(u64, u64)> {
        let min = self.store.iter().map(|(_, e)| e.ts).min()?;
        let max = self.store.iter().map(|(_, e)| e.ts).max()?;
        Some((min, max))
    }
}

impl TraceFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse trace file {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse trace JSON")
    }

    /// Build the stream description this file declares.
    pub fn stream(&self) -> DataStream {
        let format = if self.tep {
            StreamFormat::Tep
        } else {
            StreamFormat::Other
        };
        let mut stream = DataStream::new(self.stream_id, format).with_couplebreak(self.couplebreak);
        for event in &self.events {
            let fields: Vec<&str> = event.fields.iter().map(String::as_str).collect();
            stream.add_event(event.name.clone(), event.id, &fields);
        }
        stream
    }

    /// Open the stream for `plugin` and load every record through it.
    ///
    /// Records are loaded in timestamp order; records with equal timestamps
    /// keep their order in the file.
    pub fn ingest(self, plugin: &dyn StreamPlugin) -> Result<LoadedTrace> {
        let stream = self.stream();
        plugin
            .init(&stream)
            .with_context(|| format!("Failed to bind naps to stream {}", stream.stream_id))?;

        let mut records = self.records;
        records.sort_by_key(|r| r.ts);

        let mut store = TraceStore::new();
        for spec in records {
            let event_id = match stream.find_event_id(&spec.event) {
                Some(id) => id,
                None if spec.event == COUPLEBREAK_SWT_EVENT => COUPLEBREAK_SWT_ID,
                None => bail!("Record at ts {} has unknown event '{}'", spec.ts, spec.event),
            };

            let mut entry = TraceEntry::new(spec.ts, event_id, spec.pid)
                .with_cpu(spec.cpu)
                .with_info(spec.info);
            if let Some(bits) = spec.visible {
                entry.visible = VisibleFlags::from_bits(bits);
            }

            let mut raw = RawRecord::new();
            for (name, value) in spec.fields {
                raw.set_field(name, value);
            }

            let id = store.push(entry);
            if let Some(entry) = store.get_mut(id) {
                plugin.classify(&stream, &raw, id, entry);
            }
        }

        let task_colors = self
            .task_colors
            .into_iter()
            .map(|(pid, [r, g, b])| (pid, Color::new(r, g, b)))
            .collect();

        tracing::debug!("loaded {} entries for stream {}", store.len(), stream.stream_id);

        Ok(LoadedTrace {
            stream,
            store,
            task_colors,
        })
    }
}
