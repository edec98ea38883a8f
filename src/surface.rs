//! The drawable level surface.
//!
//! Generation passes only see the [`Surface`] trait: a bounded grid that can
//! answer whether a cell exists and accept three kinds of writes. Writes to
//! cells that don't exist are silently dropped. [`LevelMap`] is the in-memory
//! implementation used by the CLI, the exporters and the tests.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::tilemap::Tilemap;

/// Terrain category chosen by the noise classifier, ordered from low to high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainKind {
    Water,
    Sand,
    Grass,
    Rock,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 4] = [TerrainKind::Water, TerrainKind::Sand, TerrainKind::Grass, TerrainKind::Rock];

    pub fn display_name(&self) -> &'static str {
        match self {
            TerrainKind::Water => "Water",
            TerrainKind::Sand => "Sand",
            TerrainKind::Grass => "Grass",
            TerrainKind::Rock => "Rock",
        }
    }
}

/// Contents of one level cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Untouched solid cell
    #[default]
    Wall,
    /// Walkable floor (rooms, corridors, open cave)
    Ground,
    Terrain(TerrainKind),
}

pub trait Surface {
    /// Region covered by the surface. Passes generate inside these bounds.
    fn bounds(&self) -> Rect;

    /// Whether a cell exists at `p`.
    fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    fn set_ground(&mut self, p: Point);

    fn set_tile(&mut self, p: Point, kind: TerrainKind);

    /// Reset a cell to its unset (wall) state.
    fn clear(&mut self, p: Point);
}

/// Grid-backed surface. Cell `(bounds.x, bounds.y)` is stored at index 0.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelMap {
    bounds: Rect,
    cells: Tilemap<Cell>,
}

impl LevelMap {
    /// Sides longer than `i32::MAX` are clamped to it.
    pub fn new(width: usize, height: usize) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        Self::with_bounds(Rect::new(0, 0, width, height))
    }

    pub fn with_bounds(bounds: Rect) -> Self {
        let width = bounds.width.max(0) as usize;
        let height = bounds.height.max(0) as usize;
        Self { bounds, cells: Tilemap::new(width, height) }
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    fn local(&self, p: Point) -> Option<(usize, usize)> {
        let lx = p.x.checked_sub(self.bounds.x)?;
        let ly = p.y.checked_sub(self.bounds.y)?;
        if self.cells.in_bounds(lx, ly) {
            Some((lx as usize, ly as usize))
        } else {
            None
        }
    }

    pub fn cell(&self, p: Point) -> Option<Cell> {
        self.local(p).map(|(x, y)| *self.cells.get(x, y))
    }

    fn write(&mut self, p: Point, cell: Cell) {
        if let Some((x, y)) = self.local(p) {
            self.cells.set(x, y, cell);
        }
    }

    /// Number of cells holding exactly `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|(_, _, c)| **c == cell).count()
    }

    pub fn ground_cells(&self) -> Vec<Point> {
        self.cells
            .iter()
            .filter(|(_, _, c)| **c == Cell::Ground)
            .map(|(x, y, _)| Point::new(self.bounds.x + x as i32, self.bounds.y + y as i32))
            .collect()
    }

    /// Set every cell back to wall so the map can host another pass.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Wall);
    }
}

impl Surface for LevelMap {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_ground(&mut self, p: Point) {
        self.write(p, Cell::Ground);
    }

    fn set_tile(&mut self, p: Point, kind: TerrainKind) {
        self.write(p, Cell::Terrain(kind));
    }

    fn clear(&mut self, p: Point) {
        self.write(p, Cell::Wall);
    }
}
