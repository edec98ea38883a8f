//! Binary Space Partitioning (BSP) for room generation
//!
//! The surface is split recursively to a fixed depth, one room is placed in
//! every leaf, and sibling subtrees are joined bottom-up with dog-leg
//! corridors. Because every internal node links its two subtrees, all rooms end
//! up transitively connected without any explicit reachability check.
//!
//! The corridor endpoint of a subtree is always the room of its *first*
//! descendant leaf, not the room nearest to the split line. This keeps the
//! output stable for a given seed but can produce long detours; it is a known
//! limitation of this connector.

use serde::{Deserialize, Serialize};

use super::corridor;
use crate::error::PlacementWarning;
use crate::geometry::{Point, Rect};
use crate::pacing::{GenerationPass, GenerationReport};
use crate::rng::LevelRng;
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspConfig {
    /// Split depth. A fully split tree has `2^depth` leaves.
    pub depth: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    /// Below twice this length an axis is no longer preferred for splitting
    pub min_leaf_size: i32,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            room_min_size: 4,
            room_max_size: 12,
            min_leaf_size: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BspNode {
    pub bounds: Rect,
    /// Room within this leaf node (if any)
    pub room: Option<Rect>,
    children: Option<Box<(BspNode, BspNode)>>,
}

impl BspNode {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, room: None, children: None }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(&BspNode, &BspNode)> {
        self.children.as_deref().map(|(first, second)| (first, second))
    }

    /// Leaves in left-subtree-before-right-subtree order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    fn leaves_mut(&mut self) -> Vec<&mut BspNode> {
        let mut out = Vec::new();
        collect_leaves_mut(self, &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Center of the room found by always descending into the first child.
    /// Falls back to the leaf bounds when the leaf has no room yet.
    pub fn representative_center(&self) -> Point {
        let mut node = self;
        while let Some((first, _)) = node.children() {
            node = first;
        }
        node.room.unwrap_or(node.bounds).center()
    }
}

fn collect_leaves_mut<'a>(node: &'a mut BspNode, out: &mut Vec<&'a mut BspNode>) {
    if node.children.is_none() {
        out.push(node);
    } else if let Some((first, second)) = node.children.as_deref_mut() {
        collect_leaves_mut(first, out);
        collect_leaves_mut(second, out);
    }
}

/// Iterator over the leaves of a BSP tree. Never mutates the tree.
pub struct Leaves<'a> {
    stack: Vec<&'a BspNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a BspNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children() {
                Some((first, second)) => {
                    self.stack.push(second);
                    self.stack.push(first);
                }
                None => return Some(node),
            }
        }
        None
    }
}

/// Build a tree over `bounds` split to `depth`.
pub fn generate_bsp_tree<R: LevelRng + ?Sized>(
    bounds: Rect,
    depth: i32,
    min_leaf_size: i32,
    rng: &mut R,
) -> BspNode {
    let mut root = BspNode::new(bounds);
    split(&mut root, depth, min_leaf_size, rng);
    root
}

/// Recursively split a node until `depth` reaches zero.
///
/// An axis at least twice `min_leaf_size` long and strictly longer than the
/// other one is always split; otherwise the axis is a coin flip. The cut is
/// drawn so both halves keep at least `min_leaf_size` cells when the axis is
/// long enough, and at least one cell otherwise. A node whose sides are both a
/// single cell cannot be split and stays a leaf.
pub fn split<R: LevelRng + ?Sized>(node: &mut BspNode, depth: i32, min_leaf_size: i32, rng: &mut R) {
    if depth <= 0 {
        return;
    }

    let bounds = node.bounds;
    let preferred = min_leaf_size.saturating_mul(2);
    let mut cut_x = if bounds.width >= preferred && bounds.width > bounds.height {
        true
    } else if bounds.height >= preferred && bounds.height > bounds.width {
        false
    } else {
        rng.chance(0.5)
    };

    if cut_x && bounds.width < 2 {
        cut_x = false;
    } else if !cut_x && bounds.height < 2 {
        cut_x = true;
    }

    let length = if cut_x { bounds.width } else { bounds.height };
    if length < 2 {
        return;
    }

    let margin = min_leaf_size.min(length / 2).max(1);
    let offset = rng.range(margin, length - margin + 1);

    let (first, second) = if cut_x {
        (
            Rect::new(bounds.x, bounds.y, offset, bounds.height),
            Rect::new(bounds.x + offset, bounds.y, bounds.width - offset, bounds.height),
        )
    } else {
        (
            Rect::new(bounds.x, bounds.y, bounds.width, offset),
            Rect::new(bounds.x, bounds.y + offset, bounds.width, bounds.height - offset),
        )
    };

    let mut first = BspNode::new(first);
    let mut second = BspNode::new(second);
    split(&mut first, depth - 1, min_leaf_size, rng);
    split(&mut second, depth - 1, min_leaf_size, rng);
    node.children = Some(Box::new((first, second)));
}

/// Pick a room strictly inside `leaf`.
///
/// Fails when the leaf is smaller than the minimum room size on either axis;
/// callers fall back to the leaf bounds.
pub fn place_room<R: LevelRng + ?Sized>(
    leaf: Rect,
    config: &BspConfig,
    rng: &mut R,
) -> Result<Rect, PlacementWarning> {
    let min = config.room_min_size;
    if leaf.width < min || leaf.height < min {
        return Err(PlacementWarning::LeafTooSmall { leaf, min_room_size: min });
    }

    let width = rng.range(min, leaf.width.min(config.room_max_size).saturating_add(1));
    let height = rng.range(min, leaf.height.min(config.room_max_size).saturating_add(1));

    // Upper bound is kept above the lower one so a room filling the leaf still samples.
    let x = rng.range(leaf.x, leaf.max_x().saturating_sub(width).max(leaf.x.saturating_add(1)));
    let y = rng.range(leaf.y, leaf.max_y().saturating_sub(height).max(leaf.y.saturating_add(1)));

    Ok(Rect::new(x, y, width, height))
}

/// Corridor endpoints for every internal node, children before parents.
pub fn connect_nodes(node: &BspNode) -> Vec<(Point, Point)> {
    let mut links = Vec::new();
    collect_links(node, &mut links);
    links
}

fn collect_links(node: &BspNode, links: &mut Vec<(Point, Point)>) {
    if let Some((first, second)) = node.children() {
        collect_links(first, links);
        collect_links(second, links);
        links.push((first.representative_center(), second.representative_center()));
    }
}

enum Phase {
    Split,
    Rooms { next: usize },
    Corridors { links: Vec<(Point, Point)>, next: usize },
    Done,
}

/// Stepwise BSP generation: one unit splits the tree, then one unit per room
/// and one per corridor.
pub struct BspPass {
    config: BspConfig,
    tree: BspNode,
    phase: Phase,
    rooms: Vec<Rect>,
    corridors: usize,
    warnings: Vec<PlacementWarning>,
}

impl BspPass {
    pub fn new(config: BspConfig, bounds: Rect) -> Self {
        Self {
            config,
            tree: BspNode::new(bounds),
            phase: Phase::Split,
            rooms: Vec::new(),
            corridors: 0,
            warnings: Vec::new(),
        }
    }

    pub fn tree(&self) -> &BspNode {
        &self.tree
    }

    fn place_next_room(&mut self, index: usize, surface: &mut dyn Surface, rng: &mut dyn LevelRng) {
        let Some(leaf) = self.tree.leaves_mut().into_iter().nth(index) else {
            return;
        };

        let room = match place_room(leaf.bounds, &self.config, rng) {
            Ok(room) => room,
            Err(warning) => {
                log::warn!("bsp: {}", warning);
                self.warnings.push(warning);
                leaf.bounds
            }
        };
        leaf.room = Some(room);

        for cell in room.cells() {
            surface.set_ground(cell);
        }
        self.rooms.push(room);
    }
}

impl GenerationPass for BspPass {
    fn name(&self) -> &'static str {
        "bsp"
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn step(&mut self, surface: &mut dyn Surface, rng: &mut dyn LevelRng) -> &'static str {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Split => {
                let depth = self.config.depth.min(i32::MAX as u32) as i32;
                split(&mut self.tree, depth, self.config.min_leaf_size, rng);
                log::debug!("bsp: split into {} leaves", self.tree.leaf_count());
                self.phase = Phase::Rooms { next: 0 };
                "split"
            }
            Phase::Rooms { next } => {
                self.place_next_room(next, surface, rng);
                self.phase = if next + 1 < self.tree.leaf_count() {
                    Phase::Rooms { next: next + 1 }
                } else {
                    let links = connect_nodes(&self.tree);
                    if links.is_empty() {
                        Phase::Done
                    } else {
                        Phase::Corridors { links, next: 0 }
                    }
                };
                "room"
            }
            Phase::Corridors { links, next } => {
                let (from, to) = links[next];
                corridor::route(surface, rng, from, to);
                self.corridors += 1;
                if next + 1 < links.len() {
                    self.phase = Phase::Corridors { links, next: next + 1 };
                }
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
            warnings: self.warnings.clone(),
        }
    }
}
