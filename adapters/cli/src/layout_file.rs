//! Plain-text maze layouts: one line per row, one glyph per tile.

use heartwood_core::{CellCoord, TerrainKind, TerrainRaster};
use thiserror::Error;
use tracing::{debug, warn};

/// Glyph marking an entrance tile.
const ENTRANCE_GLYPH: char = 'E';
/// Glyph marking the heart, the destination visitors walk towards.
const HEART_GLYPH: char = 'H';

/// Errors that can occur while parsing a layout file.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    /// The file contained no rows, or only empty ones.
    #[error("layout contains no tiles")]
    Empty,
    /// The layout has more rows or columns than a grid can address.
    #[error("layout of {columns}x{rows} tiles is too large")]
    TooLarge {
        /// Number of glyphs in the longest row.
        columns: usize,
        /// Number of rows in the file.
        rows: usize,
    },
}

/// Terrain raster plus the markers recovered from a layout file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Layout {
    raster: TerrainRaster,
    entrances: Vec<CellCoord>,
    heart: Option<CellCoord>,
    unknown_glyphs: usize,
}

impl Layout {
    /// Parses a layout from its text form.
    ///
    /// Rows shorter than the longest row are padded with walls. Unknown
    /// glyphs are logged and treated as walls.
    pub(crate) fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let height = rows
            .iter()
            .rposition(|row| !row.is_empty())
            .map_or(0, |last| last + 1);
        let width = rows[..height]
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LayoutError::Empty);
        }

        let too_large = LayoutError::TooLarge {
            columns: width,
            rows: height,
        };
        let columns = u32::try_from(width)
            .ok()
            .filter(|value| i32::try_from(*value).is_ok())
            .ok_or_else(|| too_large.clone())?;
        let row_count = u32::try_from(height)
            .ok()
            .filter(|value| i32::try_from(*value).is_ok())
            .ok_or(too_large)?;

        let mut layout = Self {
            raster: TerrainRaster::filled(columns, row_count, TerrainKind::TreeBramble),
            entrances: Vec::new(),
            heart: None,
            unknown_glyphs: 0,
        };
        for (y, row) in (0_i32..).zip(&rows[..height]) {
            for (x, glyph) in (0_i32..).zip(row.chars()) {
                layout.place(CellCoord::new(x, y), glyph);
            }
        }

        debug!(
            columns,
            rows = row_count,
            entrances = layout.entrances.len(),
            heart = layout.heart.is_some(),
            "parsed layout"
        );
        Ok(layout)
    }

    /// Renders a raster as layout text, marking entrances with `E`.
    pub(crate) fn render(raster: &TerrainRaster, entrances: &[CellCoord]) -> String {
        overlay(raster, |cell| {
            entrances.contains(&cell).then_some(ENTRANCE_GLYPH)
        })
    }

    pub(crate) const fn raster(&self) -> &TerrainRaster {
        &self.raster
    }

    /// Entrances in reading order.
    pub(crate) fn entrances(&self) -> &[CellCoord] {
        &self.entrances
    }

    /// First entrance encountered in reading order.
    pub(crate) fn primary_entrance(&self) -> Option<CellCoord> {
        self.entrances.first().copied()
    }

    pub(crate) const fn heart(&self) -> Option<CellCoord> {
        self.heart
    }

    /// Number of glyphs that were not recognised and became walls.
    pub(crate) const fn unknown_glyphs(&self) -> usize {
        self.unknown_glyphs
    }

    fn place(&mut self, cell: CellCoord, glyph: char) {
        let terrain = match glyph {
            ENTRANCE_GLYPH => {
                self.entrances.push(cell);
                TerrainKind::Path
            }
            HEART_GLYPH => {
                if self.heart.is_none() {
                    self.heart = Some(cell);
                }
                TerrainKind::Path
            }
            other => TerrainKind::from_glyph(other).unwrap_or_else(|| {
                warn!(%cell, glyph = %other, "unknown layout glyph treated as wall");
                self.unknown_glyphs += 1;
                TerrainKind::TreeBramble
            }),
        };
        self.raster.set(cell, terrain);
    }
}

/// Renders a raster with per-cell glyph overrides, one row per line.
pub(crate) fn overlay<F>(raster: &TerrainRaster, mut mark: F) -> String
where
    F: FnMut(CellCoord) -> Option<char>,
{
    let width = usize::try_from(raster.width()).unwrap_or(0);
    let mut text = String::with_capacity(raster.tiles().len() + raster.tiles().len() / width.max(1));
    for (cell, kind) in raster.iter() {
        text.push(mark(cell).unwrap_or_else(|| kind.glyph()));
        if i64::from(cell.x()) + 1 == i64::from(raster.width()) {
            text.push('\n');
        }
    }
    text
}
