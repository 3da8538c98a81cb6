use serde_json::Value;
use tracing::info;

use super::document::{
    LevelBounds, LevelDocument, LevelObject, LevelSettings, VisualSpec, CURRENT_SCHEMA_VERSION,
};
use crate::config::CoreConfig;
use crate::editor::PlacedEntity;
use crate::grid::{
    authoring_row_to_runtime_row, grid_to_pixel_center, runtime_row_to_pixel_y, Vec2,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub name: String,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub music: Option<String>,
    pub ambient_light: Option<Value>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: "Untitled Level".to_string(),
            description: None,
            background_color: None,
            music: None,
            ambient_light: None,
        }
    }
}

/// Runtime pixel center for an authoring cell in a level `grid_rows` tall.
pub fn runtime_position_for_cell(col: i32, row: i32, config: &CoreConfig) -> Vec2 {
    let world_height = config.world_height();
    let runtime_row = authoring_row_to_runtime_row(row, config.cell_size, world_height);
    Vec2 {
        x: grid_to_pixel_center(col, row, config.cell_size).x,
        y: runtime_row_to_pixel_y(runtime_row, config.cell_size, world_height),
    }
}

/// Snapshots the editor's placed entities into a document a runtime can load.
pub fn build_document(
    placed: &[PlacedEntity],
    options: &BuildOptions,
    config: &CoreConfig,
) -> LevelDocument {
    let mut ordered: Vec<&PlacedEntity> = placed.iter().collect();
    ordered.sort_by_key(|entity| entity.id);

    let objects = ordered
        .into_iter()
        .map(|entity| {
            let position = runtime_position_for_cell(entity.cell.col, entity.cell.row, config);
            let mut object = LevelObject::new(entity.document_id(), entity.kind, position);
            object.visual = Some(VisualSpec {
                texture: Some(entity.texture.clone()),
                ..VisualSpec::default()
            });
            object
        })
        .collect::<Vec<_>>();

    info!(name = %options.name, objects = objects.len(), "level_document_built");

    LevelDocument {
        version: CURRENT_SCHEMA_VERSION.to_string(),
        name: options.name.clone(),
        description: options.description.clone(),
        settings: LevelSettings {
            gravity: Some(config.default_gravity),
            background_color: options.background_color.clone(),
            bounds: Some(LevelBounds {
                width: config.world_width().round() as u32,
                height: config.world_height().round() as u32,
            }),
            music: options.music.clone(),
            ambient_light: options.ambient_light.clone(),
        },
        objects,
    }
}
