//! Collection of the switch and waking events the plugin selects at load time.

pub mod collector;

pub use collector::{CollectedRecord, EventCollector};
