//! Cellular automaton cave generation
//!
//! Two equally sized boolean grids are kept side by side. Every step reads the
//! current grid, writes the other one, then swaps their roles, so no cell is
//! ever read after being overwritten in the same step. Alive cells become
//! walkable ground on the surface.
//!
//! Neighbors that fall outside the grid count as alive. With border walls on,
//! the outer ring is forced dead at initialisation and after every step.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::pacing::{GenerationPass, GenerationReport};
use crate::rng::LevelRng;
use crate::surface::Surface;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Initial probability of a cell being alive
    pub fill_chance: f64,
    /// A dead cell is born with at least this many alive neighbors (0-8)
    pub birth_threshold: u8,
    /// An alive cell survives with at least this many alive neighbors (0-8)
    pub death_threshold: u8,
    pub border_walls: bool,
    pub steps: u32,
    /// Kill alive regions smaller than this after the last step. `None` leaves regions alone.
    pub min_region_size: Option<usize>,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            fill_chance: 0.55,
            birth_threshold: 5,
            death_threshold: 4,
            border_walls: true,
            steps: 5,
            min_region_size: None,
        }
    }
}

/// One 4-connected component of cells sharing a state, in grid coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub alive: bool,
    pub cells: Vec<Point>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.cells.contains(&p)
    }
}

#[derive(Clone, Debug)]
pub struct CellularAutomaton {
    buffers: [Tilemap<bool>; 2],
    current: usize,
    border_walls: bool,
}

impl CellularAutomaton {
    /// All-dead automaton.
    pub fn new(width: usize, height: usize, border_walls: bool) -> Self {
        Self::from_cells(Tilemap::new_with(width, height, false), border_walls)
    }

    pub fn from_cells(cells: Tilemap<bool>, border_walls: bool) -> Self {
        let scratch = Tilemap::new_with(cells.width, cells.height, false);
        Self {
            buffers: [cells, scratch],
            current: 0,
            border_walls,
        }
    }

    pub fn width(&self) -> usize {
        self.buffers[0].width
    }

    pub fn height(&self) -> usize {
        self.buffers[0].height
    }

    /// The grid holding the current generation.
    pub fn cells(&self) -> &Tilemap<bool> {
        &self.buffers[self.current]
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        *self.cells().get(x, y)
    }

    pub fn set_alive(&mut self, x: usize, y: usize, alive: bool) {
        self.buffers[self.current].set(x, y, alive);
    }

    pub fn alive_count(&self) -> usize {
        self.cells().iter().filter(|(_, _, alive)| **alive).count()
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width() || y + 1 == self.height()
    }

    /// Seed the current grid: border cells dead when walls are on, every other
    /// cell alive with `fill_chance`.
    pub fn randomize<R: LevelRng + ?Sized>(&mut self, rng: &mut R, fill_chance: f64) {
        let (width, height) = (self.width(), self.height());
        for y in 0..height {
            for x in 0..width {
                let alive = if self.border_walls && self.is_border(x, y) {
                    false
                } else {
                    rng.chance(fill_chance)
                };
                self.set_alive(x, y, alive);
            }
        }
    }

    /// Alive cells among the 8 surrounding positions. Off-grid positions count as alive.
    pub fn alive_neighbors(&self, x: usize, y: usize) -> u8 {
        count_alive_neighbors(self.cells(), x, y)
    }

    /// Advance one generation and swap the buffers.
    pub fn step(&mut self, birth_threshold: u8, death_threshold: u8) {
        let border_walls = self.border_walls;
        let (front, back) = self.buffers.split_at_mut(1);
        let (read, write) = if self.current == 0 {
            (&front[0], &mut back[0])
        } else {
            (&back[0], &mut front[0])
        };

        let (width, height) = (read.width, read.height);
        for y in 0..height {
            for x in 0..width {
                let on_border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                let next = if border_walls && on_border {
                    false
                } else {
                    let neighbors = count_alive_neighbors(read, x, y);
                    if *read.get(x, y) {
                        neighbors >= death_threshold
                    } else {
                        neighbors >= birth_threshold
                    }
                };
                write.set(x, y, next);
            }
        }

        self.current = 1 - self.current;
    }

    /// Partition every cell in state `alive` into maximal 4-connected regions.
    pub fn find_regions(&self, alive: bool) -> Vec<Region> {
        let mut visited = Tilemap::new_with(self.width(), self.height(), false);
        let mut regions = Vec::new();

        for y in 0..self.height() {
            for x in 0..self.width() {
                if *visited.get(x, y) || self.is_alive(x, y) != alive {
                    continue;
                }
                regions.push(self.flood_fill(x, y, alive, &mut visited));
            }
        }

        regions
    }

    /// Breadth-first fill from `(x, y)` through 4-connected cells in state
    /// `alive`, skipping and marking cells in `visited`.
    pub fn flood_fill(&self, x: usize, y: usize, alive: bool, visited: &mut Tilemap<bool>) -> Region {
        let mut region = Region { alive, cells: Vec::new() };
        if *visited.get(x, y) || self.is_alive(x, y) != alive {
            return region;
        }

        let mut queue = VecDeque::new();
        visited.set(x, y, true);
        queue.push_back((x, y));

        while let Some((cx, cy)) = queue.pop_front() {
            region.cells.push(Point::new(cx as i32, cy as i32));

            for (nx, ny) in self.cells().neighbors_4(cx, cy) {
                if !*visited.get(nx, ny) && self.is_alive(nx, ny) == alive {
                    visited.set(nx, ny, true);
                    queue.push_back((nx, ny));
                }
            }
        }

        region
    }

    /// Kill every alive region with fewer than `min_size` cells. Returns how many were removed.
    pub fn remove_small_regions(&mut self, min_size: usize) -> usize {
        let small: Vec<Region> = self
            .find_regions(true)
            .into_iter()
            .filter(|region| region.len() < min_size)
            .collect();

        for region in &small {
            for p in &region.cells {
                self.set_alive(p.x as usize, p.y as usize, false);
            }
        }
        small.len()
    }
}

fn count_alive_neighbors(grid: &Tilemap<bool>, x: usize, y: usize) -> u8 {
    let mut count = 0;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            match grid.try_get(x as i32 + dx, y as i32 + dy) {
                Some(false) => {}
                _ => count += 1,
            }
        }
    }
    count
}

enum Phase {
    Seed,
    Simulate { done: u32 },
    Cull,
    Done,
}

/// Stepwise cave generation: seeding, each simulation step and the optional
/// region cull are one unit each. The whole grid is redrawn after every unit.
pub struct CavePass {
    config: AutomatonConfig,
    bounds: Rect,
    automaton: CellularAutomaton,
    phase: Phase,
    culled_regions: usize,
}

impl CavePass {
    pub fn new(config: AutomatonConfig, bounds: Rect) -> Self {
        let automaton = CellularAutomaton::new(
            bounds.width.max(0) as usize,
            bounds.height.max(0) as usize,
            config.border_walls,
        );
        Self {
            config,
            bounds,
            automaton,
            phase: Phase::Seed,
            culled_regions: 0,
        }
    }

    pub fn automaton(&self) -> &CellularAutomaton {
        &self.automaton
    }

    pub fn culled_regions(&self) -> usize {
        self.culled_regions
    }

    fn after_simulation(&self) -> Phase {
        if self.config.min_region_size.is_some() {
            Phase::Cull
        } else {
            Phase::Done
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        for (x, y, alive) in self.automaton.cells().iter() {
            let p = Point::new(self.bounds.x + x as i32, self.bounds.y + y as i32);
            if *alive {
                surface.set_ground(p);
            } else {
                surface.clear(p);
            }
        }
    }
}

impl GenerationPass for CavePass {
    fn name(&self) -> &'static str {
        "caves"
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn step(&mut self, surface: &mut dyn Surface, rng: &mut dyn LevelRng) -> &'static str {
        let label = match self.phase {
            Phase::Seed => {
                self.automaton.randomize(rng, self.config.fill_chance);
                self.phase = if self.config.steps > 0 {
                    Phase::Simulate { done: 0 }
                } else {
                    self.after_simulation()
                };
                "seed"
            }
            Phase::Simulate { done } => {
                self.automaton.step(self.config.birth_threshold, self.config.death_threshold);
                self.phase = if done + 1 < self.config.steps {
                    Phase::Simulate { done: done + 1 }
                } else {
                    self.after_simulation()
                };
                "simulate"
            }
            Phase::Cull => {
                let min_size = self.config.min_region_size.unwrap_or(0);
                self.culled_regions = self.automaton.remove_small_regions(min_size);
                log::debug!("caves: removed {} regions below {} cells", self.culled_regions, min_size);
                self.phase = Phase::Done;
                "cull"
            }
            Phase::Done => return "idle",
        };

        self.render(surface);
        label
    }

    fn report(&self) -> GenerationReport {
        GenerationReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::{drive, CancelToken};
    use crate::rng::seeded_rng;
    use crate::surface::{Cell, LevelMap};

    fn grid(rows: &[&str]) -> Tilemap<bool> {
        let mut cells = Tilemap::new_with(rows[0].len(), rows.len(), false);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                cells.set(x, y, c == '#');
            }
        }
        cells
    }

    #[test]
    fn test_off_grid_neighbors_count_as_alive() {
        let dead = CellularAutomaton::new(3, 3, true);
        assert_eq!(dead.alive_neighbors(1, 1), 0);
        assert_eq!(dead.alive_neighbors(0, 0), 5);
        assert_eq!(dead.alive_neighbors(1, 0), 3);

        let alive = CellularAutomaton::from_cells(Tilemap::new_with(3, 3, true), true);
        assert_eq!(alive.alive_neighbors(1, 1), 8);
        assert_eq!(alive.alive_neighbors(2, 2), 8);
    }

    #[test]
    fn test_dead_grid_births_only_at_corners() {
        let mut automaton = CellularAutomaton::new(3, 3, false);
        automaton.step(4, 4);
        for (x, y, alive) in automaton.cells().iter() {
            let corner = (x == 0 || x == 2) && (y == 0 || y == 2);
            assert_eq!(*alive, corner, "cell ({}, {})", x, y);
        }
    }

    #[test]
    fn test_border_walls_stay_dead() {
        let mut automaton = CellularAutomaton::new(3, 3, true);
        automaton.step(4, 4);
        assert_eq!(automaton.alive_count(), 0);

        let mut full = CellularAutomaton::from_cells(Tilemap::new_with(5, 5, true), true);
        full.step(0, 0);
        for (x, y, alive) in full.cells().iter() {
            assert_eq!(*alive, !full.is_border(x, y));
        }
    }

    #[test]
    fn test_survival_and_birth_thresholds() {
        let cells = grid(&[
            ".....", //
            ".###.", //
            ".....", //
        ]);
        let mut automaton = CellularAutomaton::from_cells(cells, true);
        automaton.step(3, 2);
        // Middle of the bar has two alive neighbors and survives, the ends have one
        assert!(automaton.is_alive(2, 1));
        assert!(!automaton.is_alive(1, 1));
        assert!(!automaton.is_alive(3, 1));
    }

    #[test]
    fn test_step_reads_only_previous_generation() {
        let cells = grid(&[
            "......", //
            ".#....", //
            "......", //
            "......", //
        ]);
        let mut automaton = CellularAutomaton::from_cells(cells, true);
        // Births from the new ring must not feed further births in the same step
        automaton.step(1, 9);
        assert!(!automaton.is_alive(1, 1));
        assert!(automaton.is_alive(2, 2));
        assert!(!automaton.is_alive(3, 2));
        assert!(!automaton.is_alive(4, 1));
        assert_eq!(automaton.alive_count(), 3);
    }

    #[test]
    fn test_two_blobs_make_two_regions() {
        let cells = grid(&[
            "##....", //
            "##..#.", //
            "....##", //
        ]);
        let automaton = CellularAutomaton::from_cells(cells, false);
        let regions = automaton.find_regions(true);
        assert_eq!(regions.len(), 2);

        let mut sizes: Vec<usize> = regions.iter().map(Region::len).collect();
        sizes.sort();
        assert_eq!(sizes, vec![3, 4]);

        let mut all: Vec<Point> = regions.iter().flat_map(|r| r.cells.iter().copied()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 7);
        assert!(regions.iter().any(|r| r.contains(Point::new(5, 2)) && r.contains(Point::new(4, 1))));
    }

    #[test]
    fn test_diagonal_cells_are_separate_regions() {
        let cells = grid(&[
            "#.", //
            ".#", //
        ]);
        let automaton = CellularAutomaton::from_cells(cells, false);
        assert_eq!(automaton.find_regions(true).len(), 2);
        assert_eq!(automaton.find_regions(false).len(), 2);
    }

    #[test]
    fn test_flood_fill_skips_visited_cells() {
        let automaton = CellularAutomaton::from_cells(grid(&["###"]), false);
        let mut visited = Tilemap::new_with(3, 1, false);
        visited.set(1, 0, true);
        let region = automaton.flood_fill(0, 0, true, &mut visited);
        assert_eq!(region.cells, vec![Point::new(0, 0)]);
        assert!(automaton.flood_fill(1, 0, true, &mut visited).is_empty());
    }

    #[test]
    fn test_remove_small_regions() {
        let cells = grid(&[
            "###...", //
            "###..#", //
            "......", //
        ]);
        let mut automaton = CellularAutomaton::from_cells(cells, false);
        assert_eq!(automaton.remove_small_regions(2), 1);
        assert!(!automaton.is_alive(5, 1));
        assert_eq!(automaton.alive_count(), 6);
    }

    #[test]
    fn test_pass_draws_final_generation() {
        let mut map = LevelMap::new(40, 30);
        let mut pass = CavePass::new(AutomatonConfig::default(), map.bounds());
        let report = drive(&mut pass, &mut map, &mut seeded_rng(5), &CancelToken::new()).unwrap();

        assert_eq!(report.units_completed, 1 + 5);
        let automaton = pass.automaton();
        assert_eq!(map.count(Cell::Ground), automaton.alive_count());
        for x in 0..40 {
            assert_eq!(map.cell(Point::new(x, 0)), Some(Cell::Wall));
            assert_eq!(map.cell(Point::new(x, 29)), Some(Cell::Wall));
        }
    }

    #[test]
    fn test_pass_with_cull_leaves_no_small_regions() {
        let mut map = LevelMap::new(40, 30);
        let config = AutomatonConfig { min_region_size: Some(10), ..AutomatonConfig::default() };
        let mut pass = CavePass::new(config, map.bounds());
        let report = drive(&mut pass, &mut map, &mut seeded_rng(6), &CancelToken::new()).unwrap();

        assert_eq!(report.units_completed, 1 + 5 + 1);
        assert!(pass.automaton().find_regions(true).iter().all(|r| r.len() >= 10));
        assert_eq!(map.count(Cell::Ground), pass.automaton().alive_count());
    }
}
