mod build;
mod document;
mod legacy;
mod template;
mod validate;

use serde_json::Value;
use thiserror::Error;

use crate::config::CoreConfig;

pub use build::{build_document, runtime_position_for_cell, BuildOptions};
pub use document::{
    BehaviorSpec, BodyType, EntityKind, LevelBounds, LevelDocument, LevelObject, LevelSettings,
    MovementPattern, PhysicsSpec, VisualSpec, CURRENT_SCHEMA_VERSION,
};
pub use legacy::{
    convert_legacy, convert_legacy_value, is_legacy, parse_color, LegacyLevel, LegacyPlatform,
    LegacyPlayer, LegacyWorld,
};
pub use template::{expand_template, ObjectTemplate, TemplateLibrary, TEMPLATE_PROPERTY};
pub use validate::{validate, validate_document, StructuralError};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level json is malformed: {0}")]
    Json(#[source] serde_json::Error),
    #[error("level json does not match the schema at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Parses level JSON in either the current or the legacy layout.
pub fn parse_level_json(raw: &str, config: &CoreConfig) -> Result<LevelDocument, LevelError> {
    let value: Value = serde_json::from_str(raw).map_err(LevelError::Json)?;
    parse_level_value(value, config)
}

pub fn parse_level_value(value: Value, config: &CoreConfig) -> Result<LevelDocument, LevelError> {
    if is_legacy(&value) {
        return Ok(convert_legacy_value(&value, config));
    }
    document_from_value(value)
}

/// Decodes a current-schema document. Shape errors are reported before any
/// field-level decoding so a missing `objects` list never turns into a
/// partially filled document.
pub fn document_from_value(value: Value) -> Result<LevelDocument, LevelError> {
    validate(&value)?;
    let document: LevelDocument =
        serde_path_to_error::deserialize(value).map_err(|error| {
            let path = error.path().to_string();
            LevelError::Parse {
                path,
                source: error.into_inner(),
            }
        })?;
    validate_document(&document)?;
    Ok(document)
}

pub fn document_to_json_pretty(document: &LevelDocument) -> Result<String, LevelError> {
    serde_json::to_string_pretty(document).map_err(LevelError::Json)
}
