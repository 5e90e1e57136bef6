//! naps: list the naps of one task in a JSON scheduler trace.
//!
//! Loads the trace the way the host would, then runs one draw pass for the
//! task over the requested window and prints the naps that pass produced.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use naps::histo::{Graph, Histogram};
use naps::loader::TraceFile;
use naps::render::{Color, NapRectangle};
use naps::trace::constants::DEFAULT_HISTO_ENTRIES_LIMIT;
use naps::trace::TraceStore;
use naps::{DrawAction, DrawArgs, NapConfig, NapsPlugin, SharedConfig, StreamPlugin};

#[derive(Debug, Parser)]
#[command(name = "naps")]
#[command(about = "Find the naps of a task in a scheduler trace")]
#[command(version)]
struct Command {
    /// Path to the JSON trace file
    trace: PathBuf,

    /// Task to look for naps of
    #[arg(short, long)]
    pid: i32,

    /// Start of the visible window (defaults to the first entry)
    #[arg(long)]
    start: Option<u64>,

    /// End of the visible window (defaults to the last entry)
    #[arg(long)]
    end: Option<u64>,

    /// Number of histogram bins in the window
    #[arg(long, default_value = "1000")]
    bins: usize,

    /// Plot width in pixels
    #[arg(long, default_value = "2000")]
    width: i32,

    /// Visible entry count above which no naps are drawn
    #[arg(long, default_value_t = DEFAULT_HISTO_ENTRIES_LIMIT)]
    limit: usize,

    /// Outline naps with the task's color
    #[arg(long)]
    task_coloring: bool,

    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    format: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct NapRow {
    switch_ts: u64,
    waking_ts: u64,
    duration_ns: u64,
    state: String,
    label: String,
    fill: String,
    outline: String,
    drawn: bool,
    label_shown: bool,
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn nap_row(store: &TraceStore, nap: &NapRectangle) -> Option<NapRow> {
    let switch_ts = store.get(nap.start_entry)?.ts;
    let waking_ts = store.get(nap.end_entry)?.ts;
    let drawn = nap.is_level();
    Some(NapRow {
        switch_ts,
        waking_ts,
        duration_ns: waking_ts.saturating_sub(switch_ts),
        state: nap.state.to_string(),
        label: nap.raw_text.clone(),
        fill: hex(nap.rect.color),
        outline: hex(nap.outline_up.color),
        drawn,
        label_shown: drawn && nap.label_fits(),
    })
}

fn print_table(rows: &[NapRow]) {
    println!(
        "{:>16} {:>16} {:>14} {:>5} {:<30} {:>8} {:>8}",
        "switch_ts", "waking_ts", "duration_ns", "state", "label", "fill", "outline"
    );
    for row in rows {
        println!(
            "{:>16} {:>16} {:>14} {:>5} {:<30} {:>8} {:>8}",
            row.switch_ts,
            row.waking_ts,
            row.duration_ns,
            row.state,
            row.label,
            row.fill,
            row.outline
        );
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "naps=debug" } else { "naps=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let opts = Command::parse();
    init_logging(opts.verbose);

    if opts.pid < 0 {
        bail!("Task id must not be negative: {}", opts.pid);
    }

    let config = SharedConfig::new(NapConfig {
        histo_entries_limit: opts.limit,
        use_task_coloring: opts.task_coloring,
    });
    let plugin = NapsPlugin::with_config(config);

    let trace = TraceFile::from_path(&opts.trace)?.ingest(&plugin)?;
    let Some((first, last)) = trace.time_range() else {
        bail!("Trace {} has no records", opts.trace.display());
    };
    let start = opts.start.unwrap_or(first);
    let end = opts.end.unwrap_or(last);
    if start > end {
        bail!("Window start {start} is after window end {end}");
    }

    let histo = Histogram::from_store(&trace.store, start, end, opts.bins);
    let graph = Graph::row(histo.n_bins(), opts.width, 0);
    let args = DrawArgs {
        store: &trace.store,
        histo: &histo,
        graph: &graph,
        task_colors: &trace.task_colors,
    };

    let stream_id = trace.stream.stream_id;
    let naps = if NapsPlugin::should_draw(&plugin.config().snapshot(), &histo, DrawAction::Task) {
        plugin.collect_naps(&args, stream_id, opts.pid)
    } else {
        eprintln!(
            "{} visible entries exceed the limit of {}, no naps drawn",
            histo.total_count(),
            opts.limit
        );
        Vec::new()
    };

    let rows: Vec<NapRow> = naps
        .iter()
        .filter_map(|nap| nap_row(&trace.store, nap))
        .collect();

    match opts.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => print_table(&rows),
    }

    if let Some(ctx) = plugin.contexts().get(stream_id) {
        let diag = &ctx.diagnostics;
        if diag.unresolved_wakings() + diag.malformed_info() + diag.unmapped_states() > 0 {
            eprintln!(
                "Warning: {} unresolved wakings, {} switches without prev_state, {} unknown states",
                diag.unresolved_wakings(),
                diag.malformed_info(),
                diag.unmapped_states()
            );
        }
    }
    eprintln!("\n{} naps for task {}", rows.len(), opts.pid);

    plugin.deinit(&trace.stream);
    Ok(())
}
