//! Grid geometry: column count, gaps and track placement.
//!
//! Geometry is derived, never stored authoritatively. It is recomputed on every pass
//! from the container width and the configured item size and gap policy.
//!
//! # Column count
//!
//! - Fixed gap `g`: `floor((container - item) / (item + g)) + 1`
//! - Justify: `floor(container / item)`, with the column gap stretched so that the
//!   columns and their gaps exactly fill the container:
//!   `(container - item) / (columns - 1) - item`
//!
//! A container narrower than one item still gets a single column; the justify gap is zero
//! whenever there is at most one column.

use crate::model::{BoundingBox, GridError};

/// Horizontal gap policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapSpec {
    /// Constant gap in pixels.
    Fixed(f64),
    /// Gap stretched to fill the container width.
    Justify,
}

impl Default for GapSpec {
    fn default() -> Self {
        Self::Fixed(10.0)
    }
}

impl std::str::FromStr for GapSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("justify") {
            return Ok(Self::Justify);
        }
        let px = trimmed.trim_end_matches("px");
        px.parse::<f64>()
            .map(Self::Fixed)
            .map_err(|_| format!("expected a pixel value or \"justify\", got {s:?}"))
    }
}

/// Distribution of free horizontal space, as CSS `justify-content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyMode {
    /// Tracks packed at the start.
    #[default]
    None,
    /// Equal space around every track; half-size space at both edges.
    SpaceAround,
    /// Equal space between tracks; none at the edges.
    SpaceBetween,
}

impl JustifyMode {
    /// CSS keyword for this mode.
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::None => "normal",
            Self::SpaceAround => "space-around",
            Self::SpaceBetween => "space-between",
        }
    }
}

impl std::str::FromStr for JustifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "normal" => Ok(Self::None),
            "space-around" => Ok(Self::SpaceAround),
            "space-between" => Ok(Self::SpaceBetween),
            other => Err(format!(
                "expected none, space-around or space-between, got {other:?}"
            )),
        }
    }
}

/// Inputs to [`compute_geometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    /// Current container width.
    pub container_width_px: f64,
    /// Width of every item.
    pub item_width_px: f64,
    /// Height of every item (also the row track size).
    pub item_height_px: f64,
    /// Horizontal gap policy.
    pub x_gap: GapSpec,
    /// Vertical gap.
    pub y_gap_px: f64,
    /// Free space distribution.
    pub justify: JustifyMode,
}

/// Derived grid geometry handed to the geometry sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Number of column tracks.
    pub column_count: usize,
    /// Width of each column track.
    pub column_width_px: f64,
    /// Height of each row track.
    pub row_height_px: f64,
    /// Gap between rows.
    pub row_gap_px: f64,
    /// Gap between columns.
    pub column_gap_px: f64,
    /// Free space distribution.
    pub justify: JustifyMode,
}

impl GridGeometry {
    /// CSS `grid-template-columns` value: one fixed track per column.
    pub fn column_template(&self) -> String {
        vec![format!("{}px", self.column_width_px); self.column_count].join(" ")
    }

    /// Width of all tracks plus the gaps between them.
    pub fn occupied_width(&self) -> f64 {
        let columns = self.column_count as f64;
        columns * self.column_width_px + (columns - 1.0).max(0.0) * self.column_gap_px
    }

    /// Left edge of every column track inside a container of the given width.
    pub fn track_offsets(&self, container_width_px: f64) -> Vec<f64> {
        let free = (container_width_px - self.occupied_width()).max(0.0);
        let columns = self.column_count;
        let (lead, between) = match self.justify {
            JustifyMode::None => (0.0, 0.0),
            JustifyMode::SpaceBetween if columns > 1 => (0.0, free / (columns - 1) as f64),
            JustifyMode::SpaceBetween => (0.0, 0.0),
            JustifyMode::SpaceAround => {
                let share = free / columns.max(1) as f64;
                (share / 2.0, share)
            }
        };
        let pitch = self.column_width_px + self.column_gap_px + between;
        (0..columns).map(|c| lead + c as f64 * pitch).collect()
    }

    /// Box of the item at `index` when auto-placed row by row.
    ///
    /// Recomputes the track offsets; use [`place`](Self::place) when placing many items.
    pub fn cell_box(&self, index: usize, container_width_px: f64) -> BoundingBox {
        self.place(index, &self.track_offsets(container_width_px))
    }

    /// Box of the item at `index` given offsets from [`track_offsets`](Self::track_offsets).
    pub fn place(&self, index: usize, offsets: &[f64]) -> BoundingBox {
        let columns = self.column_count.max(1);
        let row = index / columns;
        let x = offsets.get(index % columns).copied().unwrap_or(0.0);
        let y = row as f64 * (self.row_height_px + self.row_gap_px);
        BoundingBox::new(x, y, self.column_width_px, self.row_height_px)
    }

    /// Total height of `item_count` items laid out on this grid.
    pub fn content_height(&self, item_count: usize) -> f64 {
        if item_count == 0 {
            return 0.0;
        }
        let rows = item_count.div_ceil(self.column_count.max(1)) as f64;
        rows * self.row_height_px + (rows - 1.0) * self.row_gap_px
    }
}

/// Derive grid geometry.
///
/// # Errors
///
/// Returns [`GridError::InvalidGeometryInput`] for non-positive or non-finite container or
/// item dimensions, and for negative or non-finite gaps.
pub fn compute_geometry(input: &LayoutInput) -> Result<GridGeometry, GridError> {
    let invalid = |reason| GridError::InvalidGeometryInput {
        container_width_px: input.container_width_px,
        item_width_px: input.item_width_px,
        reason,
    };

    if !input.container_width_px.is_finite() || input.container_width_px <= 0.0 {
        return Err(invalid("container width must be positive"));
    }
    if !input.item_width_px.is_finite() || input.item_width_px <= 0.0 {
        return Err(invalid("item width must be positive"));
    }
    if !input.item_height_px.is_finite() || input.item_height_px <= 0.0 {
        return Err(invalid("item height must be positive"));
    }
    if !input.y_gap_px.is_finite() || input.y_gap_px < 0.0 {
        return Err(invalid("row gap must be non-negative"));
    }

    let (column_count, column_gap_px) = match input.x_gap {
        GapSpec::Fixed(gap) => {
            if !gap.is_finite() || gap < 0.0 {
                return Err(invalid("column gap must be non-negative"));
            }
            let fit = ((input.container_width_px - input.item_width_px)
                / (input.item_width_px + gap))
                .floor()
                + 1.0;
            (fit.max(1.0) as usize, gap)
        }
        GapSpec::Justify => {
            let count = (input.container_width_px / input.item_width_px).floor() as usize;
            let gap = justified_gap(input.container_width_px, input.item_width_px, count);
            (count.max(1), gap)
        }
    };

    Ok(GridGeometry {
        column_count,
        column_width_px: input.item_width_px,
        row_height_px: input.item_height_px,
        row_gap_px: input.y_gap_px,
        column_gap_px,
        justify: input.justify,
    })
}

/// Gap that makes `columns` items of `item` width exactly span `container`.
fn justified_gap(container: f64, item: f64, columns: usize) -> f64 {
    if columns <= 1 {
        return 0.0;
    }
    let gap = (container - item) / (columns - 1) as f64 - item;
    // floor() guarantees columns * item <= container, so only rounding noise can go negative
    if gap <= 0.0 {
        0.0
    } else {
        gap
    }
}
