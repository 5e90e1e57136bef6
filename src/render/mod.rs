//! Turning matched naps into plot objects.
//!
//! A nap is drawn as a filled rectangle between the bins of its switch and
//! waking entries, colored by the switched-out task's `prev_state`, with a
//! thin outline on its upper and lower edge and, if it is wide enough, the
//! state's name written on it.

pub mod prev_state;
pub mod shapes;

use std::collections::HashMap;

pub use shapes::{Color, Line, PlotSurface, Point, Rectangle, Shape, ShapeList, TextBox};

use crate::context::NapDiagnostics;
use crate::error::NapError;
use crate::histo::Graph;
use crate::matcher::NapMatch;
use crate::trace::constants::{FONT_SIZE, NAP_HEIGHT, NAP_HEIGHT_OFFSET};
use crate::trace::{EntryId, TraceStore};

/// The host's display colors of tasks, keyed by pid.
pub type ColorTable = HashMap<i32, Color>;

/// Outline color used when task coloring is on but the task has no color.
/// Drawing it white makes the rectangle look thinner, which hints at the miss.
pub const TASK_COLOR_NOT_FOUND: Color = Color::WHITE;

/// Luminance above which text is drawn black.
const INTENSITY_LIMIT: f32 = 128.0;

/// Black text on bright backgrounds, white text otherwise.
pub fn text_color_for(luminance: f32) -> Color {
    if luminance > INTENSITY_LIMIT {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

/// Corners of a nap rectangle spanning the anchors of two bins.
///
/// The rectangle sits a fixed band below the plot's base line and is pulled
/// in by a pixel on each side so neighbouring naps don't touch.
pub fn nap_rect_points(start: Point, end: Point) -> [Point; 4] {
    [
        Point::new(start.x + 1, start.y - NAP_HEIGHT_OFFSET - NAP_HEIGHT),
        Point::new(start.x + 1, start.y - NAP_HEIGHT_OFFSET),
        Point::new(end.x - 1, end.y - NAP_HEIGHT_OFFSET),
        Point::new(end.x - 1, end.y - NAP_HEIGHT_OFFSET - NAP_HEIGHT),
    ]
}

/// Rendering settings for one draw call.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions<'a> {
    pub use_task_coloring: bool,
    pub task_colors: &'a ColorTable,
}

/// A nap ready to be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NapRectangle {
    /// Entry the nap starts at (the switch-out).
    pub start_entry: EntryId,
    /// Entry the nap ends at (the wake-up).
    pub end_entry: EntryId,
    /// The switch entry's prev_state letter.
    pub state: char,
    pub rect: Rectangle,
    pub outline_up: Line,
    pub outline_down: Line,
    pub text: TextBox,
    /// Upper-cased state name shown on the rectangle.
    pub raw_text: String,
    /// True if task coloring was requested but the task had no color.
    pub outline_fallback: bool,
}

impl NapRectangle {
    pub fn new(
        start_entry: EntryId,
        end_entry: EntryId,
        state: char,
        state_name: &str,
        rect: Rectangle,
        outline_col: Color,
        text_col: Color,
    ) -> Self {
        let [p0, p1, p2, p3] = rect.points;
        let outline_up = Line {
            a: p0,
            b: p3,
            color: outline_col,
        };
        let outline_down = Line {
            a: p1,
            b: p2,
            color: outline_col,
        };

        let raw_text = state_name.to_uppercase();
        let text_len = raw_text.chars().count() as i32;
        // Rough centering; the font is proportional.
        let half_width = (p3.x - p0.x) / 2;
        let text_centering = text_len * FONT_SIZE / 3;
        let anchor = Point::new(p0.x + half_width - text_centering, p1.y + 1);
        let text = TextBox {
            text: raw_text.clone(),
            color: text_col,
            anchor,
            font_size: FONT_SIZE + 2,
        };

        Self {
            start_entry,
            end_entry,
            state,
            rect,
            outline_up,
            outline_down,
            text,
            raw_text,
            outline_fallback: false,
        }
    }

    /// True if the rectangle's top edge is horizontal, i.e. both ends sit on
    /// the same plot row.
    pub fn is_level(&self) -> bool {
        self.rect.points[0].y == self.rect.points[3].y
    }

    pub fn width(&self) -> i32 {
        self.rect.points[3].x - self.rect.points[0].x
    }

    /// True if the label is estimated to fit inside the rectangle.
    pub fn label_fits(&self) -> bool {
        self.width() > self.raw_text.chars().count() as i32 * FONT_SIZE
    }

    /// Draw the nap onto a surface. Returns false if it was not drawn
    /// because its ends are on different rows.
    pub fn draw(&self, surface: &mut dyn PlotSurface) -> bool {
        if !self.is_level() {
            return false;
        }
        surface.draw_shape(Shape::Rectangle(self.rect.clone()));
        surface.draw_shape(Shape::Line(self.outline_up.clone()));
        surface.draw_shape(Shape::Line(self.outline_down.clone()));
        if self.label_fits() {
            surface.draw_shape(Shape::Text(self.text.clone()));
        }
        true
    }
}

/// Build the drawable nap for a matched pair.
///
/// Fails if the switch entry's info has no prev_state marker or the pair
/// refers to something the store or graph doesn't have; the caller is
/// expected to skip such naps. An unknown state letter is not an error, it
/// gets a neutral color and label.
pub fn make_nap_rect(
    store: &TraceStore,
    graph: &Graph,
    nap: &NapMatch,
    opts: &RenderOptions<'_>,
    diagnostics: &NapDiagnostics,
) -> Result<NapRectangle, NapError> {
    let switch_entry = store.get(nap.switch).ok_or(NapError::DanglingEntry {
        index: nap.switch.0,
    })?;

    let Some(code) = prev_state::switch_prev_state(&switch_entry.info) else {
        NapDiagnostics::bump(&diagnostics.malformed_info);
        return Err(NapError::MissingStateMarker {
            info: switch_entry.info.clone(),
        });
    };

    let (fill, name) = match prev_state::lookup(code) {
        Some(state) => (state.color, state.name),
        None => {
            NapDiagnostics::bump(&diagnostics.unmapped_states);
            tracing::debug!("unknown prev_state '{}' at ts {}", code, switch_entry.ts);
            (prev_state::UNKNOWN_STATE_COLOR, prev_state::UNKNOWN_STATE_NAME)
        }
    };

    let start = graph
        .bin(nap.start_bin)
        .ok_or(NapError::MissingAnchor { bin: nap.start_bin })?;
    let end = graph
        .bin(nap.end_bin)
        .ok_or(NapError::MissingAnchor { bin: nap.end_bin })?;

    let rect = Rectangle {
        points: nap_rect_points(start, end),
        color: fill,
        fill: true,
    };

    let (outline, outline_fallback) = if opts.use_task_coloring {
        match opts.task_colors.get(&switch_entry.pid) {
            Some(color) => (*color, false),
            None => (TASK_COLOR_NOT_FOUND, true),
        }
    } else {
        (fill, false)
    };

    let text_col = text_color_for(fill.luminance());

    let mut nap_rect =
        NapRectangle::new(nap.switch, nap.waking, code, name, rect, outline, text_col);
    nap_rect.outline_fallback = outline_fallback;
    Ok(nap_rect)
}
