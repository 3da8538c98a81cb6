use super::{GridCell, Vec2};

/// Center of an authoring cell in editor pixels.
///
/// The editor grid counts rows upward while editor pixel Y grows downward,
/// so row 0 sits just above the pixel origin at `y = -cell_size / 2`.
pub fn grid_to_pixel_center(col: i32, row: i32, cell_size: f32) -> Vec2 {
    let half = cell_size * 0.5;
    Vec2 {
        x: col as f32 * cell_size + half,
        y: -((row as f32) + 1.0) * cell_size + half,
    }
}

/// Inverse of [`grid_to_pixel_center`]: the cell containing an editor pixel.
pub fn pixel_to_grid(x: f32, y: f32, cell_size: f32) -> GridCell {
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return GridCell::new(0, 0);
    }
    GridCell {
        col: (x / cell_size).floor() as i32,
        row: (-y / cell_size).floor() as i32,
    }
}

/// Runtime rows are counted from the floor of a level `world_height` pixels
/// tall. Rows outside the level are clamped onto the nearest valid row.
pub fn authoring_row_to_runtime_row(row: i32, cell_size: f32, world_height: f32) -> i32 {
    let max_row = max_runtime_row(cell_size, world_height);
    row.clamp(0, max_row)
}

/// Pixel Y of a runtime row's center, with Y growing downward from the top
/// of the level.
pub fn runtime_row_to_pixel_y(row: i32, cell_size: f32, world_height: f32) -> f32 {
    world_height - row as f32 * cell_size - cell_size * 0.5
}

fn max_runtime_row(cell_size: f32, world_height: f32) -> i32 {
    if !(cell_size.is_finite() && cell_size > 0.0) || !world_height.is_finite() {
        return 0;
    }
    let rows = (world_height / cell_size).floor() as i32;
    rows.saturating_sub(1).max(0)
}
