//! Host data stream description.
//!
//! A [`DataStream`] is what the host knows about one loaded trace: its id, the
//! format it was read from, the numeric ids it assigned to event names, the
//! field schema of each event and whether coupled mode is on.

use std::collections::HashMap;

use crate::trace::FieldDescriptor;

/// Format of the data behind a stream. Only tracefs (tep) data carries the
/// scheduler events and field schema the plugin needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamFormat {
    Tep,
    Other,
}

#[derive(Clone, Debug)]
pub struct DataStream {
    pub stream_id: i32,
    pub format: StreamFormat,
    /// Coupled mode: the host splits each waking event and emits a synthetic
    /// target entry owned by the woken task.
    pub couplebreak_on: bool,
    event_ids: HashMap<String, i32>,
    event_fields: HashMap<i32, Vec<String>>,
}

impl DataStream {
    pub fn new(stream_id: i32, format: StreamFormat) -> Self {
        Self {
            stream_id,
            format,
            couplebreak_on: false,
            event_ids: HashMap::new(),
            event_fields: HashMap::new(),
        }
    }

    /// Register an event name with its numeric id and field names.
    pub fn add_event(&mut self, name: impl Into<String>, event_id: i32, fields: &[&str]) {
        self.event_ids.insert(name.into(), event_id);
        self.event_fields
            .insert(event_id, fields.iter().map(|f| f.to_string()).collect());
    }

    pub fn with_couplebreak(mut self, on: bool) -> Self {
        self.couplebreak_on = on;
        self
    }

    pub fn is_tep(&self) -> bool {
        self.format == StreamFormat::Tep
    }

    pub fn find_event_id(&self, name: &str) -> Option<i32> {
        self.event_ids.get(name).copied()
    }

    /// Look up a field of an event's payload by name.
    pub fn find_field(&self, event_id: i32, name: &str) -> Option<FieldDescriptor> {
        self.event_fields
            .get(&event_id)?
            .iter()
            .any(|f| f == name)
            .then(|| FieldDescriptor {
                event_id,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_and_field_lookup() {
        let mut stream = DataStream::new(0, StreamFormat::Tep);
        stream.add_event("sched/sched_waking", 7, &["comm", "pid", "prio"]);

        assert_eq!(stream.find_event_id("sched/sched_waking"), Some(7));
        assert_eq!(stream.find_event_id("sched/sched_wakeup"), None);

        let field = stream.find_field(7, "pid").unwrap();
        assert_eq!(field.event_id, 7);
        assert_eq!(field.name, "pid");
        assert!(stream.find_field(7, "target_cpu").is_none());
        assert!(stream.find_field(8, "pid").is_none());
    }

    #[test]
    fn test_format() {
        assert!(DataStream::new(0, StreamFormat::Tep).is_tep());
        assert!(!DataStream::new(0, StreamFormat::Other).is_tep());
    }
}
