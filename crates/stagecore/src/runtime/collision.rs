use crate::grid::Vec2;

use super::entity::Entity;

/// Axis-aligned box with `x`/`y` at the top-left corner and Y growing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w * 0.5,
            y: self.y + self.h * 0.5,
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Distance `other` reaches into `self` from `side`. Moving the two
    /// boxes apart by this amount along that axis leaves them touching.
    pub fn penetration(&self, other: &Aabb, side: Side) -> f32 {
        let depth = match side {
            Side::Right => self.right() - other.x,
            Side::Left => other.right() - self.x,
            Side::Bottom => self.bottom() - other.y,
            Side::Top => other.bottom() - self.y,
        };
        depth.max(0.0)
    }
}

/// Which side of `a` the other box touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Compares center offsets; equal magnitudes resolve to the vertical axis.
pub fn side_of(a: &Aabb, b: &Aabb) -> Side {
    let ca = a.center();
    let cb = b.center();
    let dx = cb.x - ca.x;
    let dy = cb.y - ca.y;
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    } else if dy > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Overlapping pair of entity slots; `a` precedes `b` in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotPair {
    pub a: usize,
    pub b: usize,
    pub side: Side,
}

/// Broad phase over every active, collidable entity. Each unordered pair is
/// tested exactly once.
pub(crate) fn detect_overlaps(entities: &[Entity]) -> Vec<SlotPair> {
    let candidates: Vec<(usize, Aabb)> = entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.participates_in_collision())
        .map(|(slot, entity)| (slot, entity.aabb()))
        .collect();

    let mut pairs = Vec::new();
    for (i, (slot_a, box_a)) in candidates.iter().enumerate() {
        for (slot_b, box_b) in &candidates[i + 1..] {
            if box_a.overlaps(box_b) {
                pairs.push(SlotPair {
                    a: *slot_a,
                    b: *slot_b,
                    side: side_of(box_a, box_b),
                });
            }
        }
    }
    pairs
}
