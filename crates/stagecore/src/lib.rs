pub mod config;
pub mod editor;
pub mod grid;
pub mod level;
pub mod runtime;

pub use config::{ConfigError, CoreConfig};
pub use editor::{LevelEditor, PlacedEntity, PlacedId, PlacementResult, RejectReason};
pub use grid::{GridCell, OccupancyIndex, Size, Vec2};
pub use level::{
    convert_legacy, document_to_json_pretty, parse_level_json, BuildOptions, EntityKind,
    LevelDocument, LevelError, LevelObject, StructuralError, TemplateLibrary,
    CURRENT_SCHEMA_VERSION,
};
pub use runtime::{
    CollisionCategory, CollisionEvent, Entity, EntityId, EntityRegistry, PlaySession,
    ResponseHooks, Side,
};
