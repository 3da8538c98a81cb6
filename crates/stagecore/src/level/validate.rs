use serde_json::Value;
use thiserror::Error;

use super::document::LevelDocument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("level document must be a JSON object")]
    NotAnObject,
    #[error("level document is missing `version`")]
    MissingVersion,
    #[error("level document is missing `objects`")]
    MissingObjects,
    #[error("level document `objects` must be a list")]
    ObjectsNotList,
    #[error("objects[{index}].position must be finite")]
    NonFinitePosition { index: usize },
}

/// Shape check run on raw JSON before typed decoding. All-or-nothing: a
/// document that fails here is never partially loaded.
pub fn validate(raw: &Value) -> Result<(), StructuralError> {
    let Some(root) = raw.as_object() else {
        return Err(StructuralError::NotAnObject);
    };
    match root.get("version") {
        None | Some(Value::Null) => return Err(StructuralError::MissingVersion),
        Some(_) => {}
    }
    match root.get("objects") {
        None | Some(Value::Null) => Err(StructuralError::MissingObjects),
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(StructuralError::ObjectsNotList),
    }
}

/// Checks the invariants a decoded document must still satisfy before a
/// runtime will accept it.
pub fn validate_document(doc: &LevelDocument) -> Result<(), StructuralError> {
    if doc.version.trim().is_empty() {
        return Err(StructuralError::MissingVersion);
    }
    for (index, object) in doc.objects.iter().enumerate() {
        if !object.position.is_finite() {
            return Err(StructuralError::NonFinitePosition { index });
        }
    }
    Ok(())
}
