//! The `prev_state` of a switch entry and how each state is shown.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::Color;

/// The state letter is the character right before the first `" ==>"` in a
/// `sched_switch` info string, e.g. `... prev_state=S ==> next_comm=...`.
static PREV_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.) ==>").expect("Invalid prev_state regex pattern"));

/// Display properties of one task state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SleepState {
    pub code: char,
    pub color: Color,
    pub name: &'static str,
}

/// Fill color used for a state letter missing from the table.
pub const UNKNOWN_STATE_COLOR: Color = Color::new(128, 128, 128);

/// Label used for a state letter missing from the table.
pub const UNKNOWN_STATE_NAME: &str = "unknown";

static SLEEP_STATES: LazyLock<HashMap<char, SleepState>> = LazyLock::new(|| {
    [
        ('D', Color::new(255, 0, 0), "uninterruptible (disk) sleep"),
        ('I', Color::new(255, 255, 0), "idle"),
        ('P', Color::new(255, 165, 0), "parked"),
        ('R', Color::new(0, 255, 0), "running"),
        ('S', Color::new(0, 0, 255), "sleeping"),
        ('T', Color::new(0, 255, 255), "stopped"),
        ('t', Color::new(139, 69, 19), "tracing stop"),
        ('X', Color::new(255, 0, 255), "dead"),
        ('Z', Color::new(128, 0, 128), "zombie"),
    ]
    .into_iter()
    .map(|(code, color, name)| (code, SleepState { code, color, name }))
    .collect()
});

/// Read the prev_state letter out of a switch entry's info string.
pub fn switch_prev_state(info: &str) -> Option<char> {
    PREV_STATE_RE
        .captures(info)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
}

pub fn lookup(code: char) -> Option<&'static SleepState> {
    SLEEP_STATES.get(&code)
}
