//! Fixed grid templates for every (image count, layout) pair

use crate::state::{CollageLayout, CollageState};
use crate::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Scale every edge by `ratio`, rounding edges rather than sizes so
    /// adjacent cells stay adjacent.
    pub fn scaled(&self, ratio: f32) -> Rect {
        let edge = |v: u32| (v as f32 * ratio).round() as u32;
        let x = edge(self.x);
        let y = edge(self.y);
        Rect {
            x,
            y,
            width: edge(self.right()).saturating_sub(x),
            height: edge(self.bottom()).saturating_sub(y),
        }
    }
}

/// Placement of one image in grid tracks (zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
    pub col_span: u32,
    pub row_span: u32,
}

const fn cell(col: u32, row: u32, col_span: u32, row_span: u32) -> GridCell {
    GridCell {
        col,
        row,
        col_span,
        row_span,
    }
}

/// A CSS-grid-like template: equal tracks plus one cell per image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTemplate {
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<GridCell>,
}

/// Look up the template for `count` images in `layout`.
///
/// This is a table, not a computation. Counts outside 1..=4 are clamped;
/// `CollageState` never produces them.
pub fn template_for(count: usize, layout: CollageLayout) -> GridTemplate {
    let count = count.clamp(1, crate::MAX_IMAGES) as u32;
    let (columns, rows, cells): (u32, u32, Vec<GridCell>) = match (layout, count) {
        (_, 1) => (1, 1, vec![cell(0, 0, 1, 1)]),
        (CollageLayout::Grid, 2) => (2, 1, vec![cell(0, 0, 1, 1), cell(1, 0, 1, 1)]),
        (CollageLayout::Grid, 3) => (
            2,
            2,
            vec![cell(0, 0, 1, 2), cell(1, 0, 1, 1), cell(1, 1, 1, 1)],
        ),
        (CollageLayout::Grid, _) => (
            2,
            2,
            vec![
                cell(0, 0, 1, 1),
                cell(1, 0, 1, 1),
                cell(0, 1, 1, 1),
                cell(1, 1, 1, 1),
            ],
        ),
        (CollageLayout::Horizontal, n) => (n, 1, (0..n).map(|i| cell(i, 0, 1, 1)).collect()),
        (CollageLayout::Vertical, n) => (1, n, (0..n).map(|i| cell(0, i, 1, 1)).collect()),
    };
    GridTemplate {
        columns,
        rows,
        cells,
    }
}

impl GridTemplate {
    /// Resolve cells to rectangles on a canvas with `gap` pixels between tracks.
    pub fn resolve(&self, canvas: Canvas, gap: u32) -> Vec<Rect> {
        let col_edges = track_edges(canvas.width, self.columns, gap);
        let row_edges = track_edges(canvas.height, self.rows, gap);
        self.cells
            .iter()
            .map(|c| {
                let (x, _) = col_edges[c.col as usize];
                let (_, right) = col_edges[(c.col + c.col_span - 1) as usize];
                let (y, _) = row_edges[c.row as usize];
                let (_, bottom) = row_edges[(c.row + c.row_span - 1) as usize];
                Rect {
                    x,
                    y,
                    width: right - x,
                    height: bottom - y,
                }
            })
            .collect()
    }
}

/// Start/end of each of `tracks` equal tracks along `extent`, separated by `gap`.
fn track_edges(extent: u32, tracks: u32, gap: u32) -> Vec<(u32, u32)> {
    let gaps = gap.saturating_mul(tracks.saturating_sub(1));
    let usable = extent.saturating_sub(gaps);
    (0..tracks)
        .map(|i| {
            let start = usable * i / tracks + gap * i;
            let end = usable * (i + 1) / tracks + gap * i;
            (start, end)
        })
        .collect()
}

/// The composed visual container for a draft: what gets captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageView {
    pub state: CollageState,
    pub template: GridTemplate,
}

impl CollageView {
    pub fn from_state(state: &CollageState) -> Self {
        Self {
            template: template_for(state.len(), state.layout()),
            state: state.clone(),
        }
    }

    /// Class names a stylesheet would key the arrangement on, e.g. `count-3 layout-grid`.
    pub fn class_name(&self) -> String {
        format!("count-{} layout-{}", self.state.len(), self.state.layout())
    }

    /// Image sources in display order
    pub fn sources(&self) -> Vec<&str> {
        self.state.images().iter().map(|i| i.src.as_str()).collect()
    }
}
