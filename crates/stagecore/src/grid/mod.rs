mod occupancy;
mod transform;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use occupancy::OccupancyIndex;
pub use transform::{
    authoring_row_to_runtime_row, grid_to_pixel_center, pixel_to_grid, runtime_row_to_pixel_y,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width/height of an axis-aligned box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn is_positive(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

/// Authoring-time cell address. Rows grow upward from the floor row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn parse_key(raw: &str) -> Option<Self> {
        let (col, row) = raw.split_once(',')?;
        let col = col.trim().parse::<i32>().ok()?;
        let row = row.trim().parse::<i32>().ok()?;
        Some(Self { col, row })
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}
