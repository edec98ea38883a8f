//! Integer grid geometry shared by every layout strategy.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the level grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle of cells. `x..x + width` by `y..y + height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge.
    pub fn max_x(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn max_y(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Middle cell of the rectangle, rounded towards the origin corner.
    pub fn center(&self) -> Point {
        Point::new(self.x.saturating_add(self.width / 2), self.y.saturating_add(self.height / 2))
    }

    pub fn area(&self) -> i64 {
        if self.is_placed() {
            self.width as i64 * self.height as i64
        } else {
            0
        }
    }

    /// A rectangle only counts as placed when it covers at least one cell.
    pub fn is_placed(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Grow the rectangle by `margin` cells on every side.
    pub fn expanded(&self, margin: i32) -> Rect {
        let grow = margin.saturating_mul(2);
        Rect::new(
            self.x.saturating_sub(margin),
            self.y.saturating_sub(margin),
            self.width.saturating_add(grow),
            self.height.saturating_add(grow),
        )
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        let Rect { x, y, width, height } = *self;
        let (max_x, max_y) = (x.saturating_add(width.max(0)), y.saturating_add(height.max(0)));
        (y..max_y).flat_map(move |cy| (x..max_x).map(move |cx| Point::new(cx, cy)))
    }
}
