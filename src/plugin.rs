//! The plugin as the host sees it.
//!
//! The host binds a [`StreamPlugin`] once and then drives it: `init` when a
//! stream is opened, `classify` for each record of the events returned by
//! [`NapsPlugin::registered_events`] while the stream loads, `draw` for every
//! visible task or CPU plot on each redraw, and `deinit` when the stream is
//! closed.

use anyhow::Result;

use crate::classify::{self, Selection};
use crate::config::{NapConfig, SharedConfig};
use crate::context::ContextRegistry;
use crate::histo::{Graph, Histogram};
use crate::matcher::NapMatcher;
use crate::render::{self, ColorTable, NapRectangle, PlotSurface, RenderOptions};
use crate::stream::DataStream;
use crate::trace::{EntryId, RawRecord, TraceEntry, TraceStore};

/// Which kind of plot the host is drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawAction {
    Task,
    Cpu,
}

/// Everything the host hands to one draw call.
#[derive(Clone, Copy, Debug)]
pub struct DrawArgs<'a> {
    pub store: &'a TraceStore,
    pub histo: &'a Histogram,
    /// The plot row being drawn.
    pub graph: &'a Graph,
    pub task_colors: &'a ColorTable,
}

/// Interface between the host and a plugin.
pub trait StreamPlugin {
    /// Bind the plugin to a stream. On error nothing is left registered.
    fn init(&self, stream: &DataStream) -> Result<()>;

    /// Unbind the plugin from a stream. Returns false if it was not bound.
    fn deinit(&self, stream: &DataStream) -> bool;

    /// Look at one record while the stream loads.
    ///
    /// Records may arrive in any order; selected records are kept sorted by
    /// the entry's timestamp.
    fn classify(&self, stream: &DataStream, rec: &RawRecord, id: EntryId, entry: &mut TraceEntry);

    /// Draw onto the plot of task or CPU `val`.
    fn draw(
        &self,
        args: &DrawArgs<'_>,
        stream_id: i32,
        val: i32,
        action: DrawAction,
        surface: &mut dyn PlotSurface,
    );
}

/// Draws task naps.
#[derive(Debug, Default)]
pub struct NapsPlugin {
    contexts: ContextRegistry,
    config: SharedConfig,
}

impl NapsPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SharedConfig) -> Self {
        Self {
            contexts: ContextRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    /// Event ids the host should route to [`StreamPlugin::classify`].
    pub fn registered_events(&self, stream_id: i32) -> Vec<i32> {
        self.contexts
            .get(stream_id)
            .map(|ctx| vec![ctx.sswitch_event_id, ctx.waking_event_id])
            .unwrap_or_default()
    }

    /// Whether a draw call should do anything at all.
    pub fn should_draw(config: &NapConfig, histo: &Histogram, action: DrawAction) -> bool {
        action == DrawAction::Task && histo.total_count() <= config.histo_entries_limit
    }

    /// Match and build the naps of task `pid`, without drawing them.
    ///
    /// Naps whose switch entry has unusable info are left out.
    pub fn collect_naps(&self, args: &DrawArgs<'_>, stream_id: i32, pid: i32) -> Vec<NapRectangle> {
        let Some(ctx) = self.contexts.get(stream_id) else {
            return Vec::new();
        };
        let config = self.config.snapshot();

        let matcher = NapMatcher::new(
            &ctx.collected_events,
            args.store,
            ctx.sswitch_event_id,
            ctx.waking_event_id,
        );
        let opts = RenderOptions {
            use_task_coloring: config.use_task_coloring,
            task_colors: args.task_colors,
        };

        matcher
            .find_naps(args.histo, pid)
            .iter()
            .filter_map(|nap| {
                render::make_nap_rect(args.store, args.graph, nap, &opts, &ctx.diagnostics)
                    .map_err(|e| tracing::debug!("skipping nap: {}", e))
                    .ok()
            })
            .collect()
    }
}

impl StreamPlugin for NapsPlugin {
    fn init(&self, stream: &DataStream) -> Result<()> {
        self.contexts.init(stream)?;
        if let Some(ctx) = self.contexts.get(stream.stream_id) {
            tracing::debug!(
                "naps bound to stream {}: switch id {}, waking id {}, coupled {}",
                stream.stream_id,
                ctx.sswitch_event_id,
                ctx.waking_event_id,
                ctx.couplebreak
            );
        }
        Ok(())
    }

    fn deinit(&self, stream: &DataStream) -> bool {
        match self.contexts.close(stream.stream_id) {
            Some(ctx) => {
                tracing::debug!(
                    "naps unbound from stream {}: {} events collected, {} unresolved wakings",
                    stream.stream_id,
                    ctx.collected_events.len(),
                    ctx.diagnostics.unresolved_wakings()
                );
                true
            }
            None => false,
        }
    }

    fn classify(&self, stream: &DataStream, rec: &RawRecord, id: EntryId, entry: &mut TraceEntry) {
        let Some(mut ctx) = self.contexts.get_mut(stream.stream_id) else {
            return;
        };
        if let Selection::Waking(pid) = classify::select_event(&mut ctx, rec, id, entry) {
            tracing::trace!("waking at ts {} keyed by pid {}", entry.ts, pid);
        }
    }

    fn draw(
        &self,
        args: &DrawArgs<'_>,
        stream_id: i32,
        val: i32,
        action: DrawAction,
        surface: &mut dyn PlotSurface,
    ) {
        let config = self.config.snapshot();
        if !Self::should_draw(&config, args.histo, action) {
            tracing::trace!(
                "naps not drawn: {:?} plot, {} visible entries",
                action,
                args.histo.total_count()
            );
            return;
        }

        for nap in self.collect_naps(args, stream_id, val) {
            nap.draw(surface);
        }
    }
}
