//! Greedy room scattering.
//!
//! Every attempt draws one random room and keeps it only if it stays on the
//! surface and clears all earlier rooms by `spacing` cells. There are no
//! retries, so crowded surfaces end up with fewer rooms than `max_rooms`.
//! Accepted rooms are chained with dog-leg corridors in placement order.

use serde::{Deserialize, Serialize};

use super::corridor;
use crate::geometry::Rect;
use crate::pacing::{GenerationPass, GenerationReport};
use crate::rng::LevelRng;
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Placement attempts, not a guaranteed room count
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    /// Free cells required between two rooms
    pub spacing: i32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            max_rooms: 30,
            room_min_size: 4,
            room_max_size: 10,
            spacing: 1,
        }
    }
}

/// Draw one candidate room with its top-left corner on the surface.
pub fn propose_room<R: LevelRng + ?Sized>(bounds: Rect, config: &ScatterConfig, rng: &mut R) -> Rect {
    let width = rng.range(config.room_min_size, config.room_max_size.saturating_add(1));
    let height = rng.range(config.room_min_size, config.room_max_size.saturating_add(1));
    let x = rng.range(bounds.x, bounds.max_x().saturating_sub(width).saturating_add(1));
    let y = rng.range(bounds.y, bounds.max_y().saturating_sub(height).saturating_add(1));
    Rect::new(x, y, width, height)
}

/// Whether `candidate` fits on the surface without crowding any accepted room.
pub fn accepts(bounds: Rect, rooms: &[Rect], candidate: &Rect, spacing: i32) -> bool {
    bounds.contains_rect(candidate) && !rooms.iter().any(|room| room.expanded(spacing).intersects(candidate))
}

enum Phase {
    Attempts { next: u32 },
    Corridors { next: usize },
    Done,
}

pub struct ScatterPass {
    config: ScatterConfig,
    bounds: Rect,
    phase: Phase,
    rooms: Vec<Rect>,
    corridors: usize,
}

impl ScatterPass {
    pub fn new(config: ScatterConfig, bounds: Rect) -> Self {
        let phase = if config.max_rooms == 0 { Phase::Done } else { Phase::Attempts { next: 0 } };
        Self {
            config,
            bounds,
            phase,
            rooms: Vec::new(),
            corridors: 0,
        }
    }

    /// Accepted rooms in placement order.
    pub fn rooms(&self) -> &[Rect] {
        &self.rooms
    }

    fn after_attempts(&self) -> Phase {
        if self.rooms.len() < 2 {
            Phase::Done
        } else {
            Phase::Corridors { next: 1 }
        }
    }
}

impl GenerationPass for ScatterPass {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn step(&mut self, surface: &mut dyn Surface, rng: &mut dyn LevelRng) -> &'static str {
        match self.phase {
            Phase::Attempts { next } => {
                let candidate = propose_room(self.bounds, &self.config, rng);
                let accepted = accepts(self.bounds, &self.rooms, &candidate, self.config.spacing);
                if accepted {
                    for cell in candidate.cells() {
                        surface.set_ground(cell);
                    }
                    self.rooms.push(candidate);
                } else {
                    log::trace!("scatter: rejected {:?}", candidate);
                }

                self.phase = if next + 1 < self.config.max_rooms {
                    Phase::Attempts { next: next + 1 }
                } else {
                    self.after_attempts()
                };
                if accepted { "room" } else { "rejected" }
            }
            Phase::Corridors { next } => {
                let from = self.rooms[next - 1].center();
                let to = self.rooms[next].center();
                corridor::route(surface, rng, from, to);
                self.corridors += 1;
                self.phase = if next + 1 < self.rooms.len() {
                    Phase::Corridors { next: next + 1 }
                } else {
                    Phase::Done
                };
                "corridor"
            }
            Phase::Done => "idle",
        }
    }

    fn report(&self) -> GenerationReport {
        GenerationReport {
            units_completed: 0,
            rooms: self.rooms.clone(),
            corridors: self.corridors,
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::{drive, CancelToken};
    use crate::rng::seeded_rng;
    use crate::surface::{Cell, LevelMap};

    #[test]
    fn test_rooms_keep_their_spacing() {
        let mut map = LevelMap::new(60, 40);
        let config = ScatterConfig { spacing: 2, ..ScatterConfig::default() };
        let mut pass = ScatterPass::new(config, map.bounds());
        let report = drive(&mut pass, &mut map, &mut seeded_rng(4), &CancelToken::new()).unwrap();

        assert!(!report.rooms.is_empty());
        assert!(report.rooms.len() <= 30);
        for (i, a) in report.rooms.iter().enumerate() {
            assert!(map.bounds().contains_rect(a));
            for b in &report.rooms[i + 1..] {
                assert!(!a.expanded(2).intersects(b), "{:?} crowds {:?}", a, b);
            }
        }
        assert_eq!(report.corridors, report.rooms.len().saturating_sub(1));
        assert_eq!(report.units_completed, 30 + report.corridors);
    }

    #[test]
    fn test_crowded_surface_rejects_attempts() {
        let mut map = LevelMap::new(12, 12);
        let config = ScatterConfig { max_rooms: 20, room_min_size: 6, room_max_size: 8, spacing: 1 };
        let mut pass = ScatterPass::new(config, map.bounds());
        let report = drive(&mut pass, &mut map, &mut seeded_rng(9), &CancelToken::new()).unwrap();
        assert!(report.rooms.len() < 20);
        assert!(!report.rooms.is_empty());
    }

    #[test]
    fn test_oversized_rooms_never_fit() {
        let mut map = LevelMap::new(5, 5);
        let config = ScatterConfig { max_rooms: 5, room_min_size: 6, room_max_size: 6, spacing: 0 };
        let mut pass = ScatterPass::new(config, map.bounds());
        let report = drive(&mut pass, &mut map, &mut seeded_rng(1), &CancelToken::new()).unwrap();
        assert!(report.rooms.is_empty());
        assert_eq!(report.corridors, 0);
        assert_eq!(map.count(Cell::Ground), 0);
    }

    #[test]
    fn test_accepts_checks_expanded_bounds() {
        let bounds = Rect::new(0, 0, 20, 20);
        let rooms = [Rect::new(2, 2, 4, 4)];
        // Touching the room is fine without spacing, one free column is needed with it
        assert!(accepts(bounds, &rooms, &Rect::new(6, 2, 3, 3), 0));
        assert!(!accepts(bounds, &rooms, &Rect::new(6, 2, 3, 3), 1));
        assert!(accepts(bounds, &rooms, &Rect::new(7, 2, 3, 3), 1));
        assert!(!accepts(bounds, &rooms, &Rect::new(5, 2, 3, 3), 0));
        assert!(!accepts(bounds, &rooms, &Rect::new(18, 2, 3, 3), 0));
    }

    #[test]
    fn test_corridors_chain_in_placement_order() {
        let mut map = LevelMap::new(80, 50);
        let mut pass = ScatterPass::new(ScatterConfig::default(), map.bounds());
        drive(&mut pass, &mut map, &mut seeded_rng(77), &CancelToken::new()).unwrap();

        // Each consecutive pair of centers lies on a carved dog-leg
        for pair in pass.rooms().windows(2) {
            let (a, b) = (pair[0].center(), pair[1].center());
            let horizontal = corridor::dog_leg(a, b, true);
            let vertical = corridor::dog_leg(a, b, false);
            let carved = |path: &[crate::geometry::Point]| path.iter().all(|p| map.cell(*p) == Some(Cell::Ground));
            assert!(carved(&horizontal) || carved(&vertical));
        }
    }

    #[test]
    fn test_zero_attempts_finish_immediately() {
        let pass = ScatterPass::new(ScatterConfig { max_rooms: 0, ..ScatterConfig::default() }, Rect::new(0, 0, 10, 10));
        assert!(pass.is_finished());
    }
}
