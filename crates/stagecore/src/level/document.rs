use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::grid::Vec2;

pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Enemy,
    Platform,
    Goal,
    Coin,
    Obstacle,
    Door,
    Trigger,
    Decoration,
    Spring,
    Spike,
    #[serde(other)]
    Unknown,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Platform,
        EntityKind::Goal,
        EntityKind::Coin,
        EntityKind::Obstacle,
        EntityKind::Door,
        EntityKind::Trigger,
        EntityKind::Decoration,
        EntityKind::Spring,
        EntityKind::Spike,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Platform => "platform",
            Self::Goal => "goal",
            Self::Coin => "coin",
            Self::Obstacle => "obstacle",
            Self::Door => "door",
            Self::Trigger => "trigger",
            Self::Decoration => "decoration",
            Self::Spring => "spring",
            Self::Spike => "spike",
            Self::Unknown => "unknown",
        }
    }

    /// Kinds limited to one instance per editable level.
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Player | Self::Door)
    }

    pub fn collides_by_default(self) -> bool {
        !matches!(self, Self::Decoration | Self::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: LevelSettings,
    pub objects: Vec<LevelObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSettings {
    /// Unset means the loader's configured gravity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LevelBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_light: Option<Value>,
}

impl LevelSettings {
    pub fn gravity_or(&self, fallback: Vec2) -> Vec2 {
        self.gravity.unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub position: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<PhysicsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorSpec>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl LevelObject {
    pub fn new(id: impl Into<String>, kind: EntityKind, position: Vec2) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            rotation: None,
            scale: None,
            layer: None,
            visible: None,
            physics: None,
            visual: None,
            behavior: None,
            properties: Map::new(),
        }
    }

    pub fn property_f32(&self, name: &str) -> Option<f32> {
        self.properties
            .get(name)
            .and_then(Value::as_f64)
            .map(|value| value as f32)
            .filter(|value| value.is_finite())
    }

    pub fn property_bool(&self, name: &str) -> Option<bool> {
        self.properties.get(name).and_then(Value::as_bool)
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Static,
    Dynamic,
    Kinematic,
    None,
}

/// Every field is optional so instance values can be layered over template
/// defaults field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collidable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restitution: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPattern {
    Patrol,
    Follow,
    Idle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_pattern: Option<MovementPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_events: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_type_field_maps_to_kind() {
        let object: LevelObject = serde_json::from_value(json!({
            "id": "s1",
            "type": "spring",
            "position": {"x": 10.0, "y": 20.0}
        }))
        .expect("object");
        assert_eq!(object.kind, EntityKind::Spring);
        assert!(object.physics.is_none());
        assert!(object.properties.is_empty());
    }

    #[test]
    fn unrecognized_type_becomes_unknown_kind() {
        let object: LevelObject = serde_json::from_value(json!({
            "id": "x",
            "type": "lava",
            "position": {"x": 0.0, "y": 0.0}
        }))
        .expect("object");
        assert_eq!(object.kind, EntityKind::Unknown);
    }

    #[test]
    fn physics_uses_camel_case_and_type_key() {
        let physics: PhysicsSpec = serde_json::from_value(json!({
            "type": "static",
            "isCollidable": false,
            "gravityScale": 0.5
        }))
        .expect("physics");
        assert_eq!(physics.body, Some(BodyType::Static));
        assert_eq!(physics.is_collidable, Some(false));
        assert_eq!(physics.gravity_scale, Some(0.5));
        assert_eq!(physics.friction, None);
    }

    #[test]
    fn omitted_gravity_stays_unset_and_is_not_written() {
        let doc: LevelDocument = serde_json::from_value(json!({
            "version": "1.0.0",
            "objects": []
        }))
        .expect("doc");
        assert_eq!(doc.settings.gravity, None);
        assert_eq!(doc.settings.gravity_or(Vec2::new(0.0, 500.0)).y, 500.0);
        assert_eq!(doc.name, "");
        let written = serde_json::to_value(&doc).expect("json");
        assert!(written["settings"].get("gravity").is_none());
    }

    #[test]
    fn serialized_object_omits_absent_optionals() {
        let object = LevelObject::new("c1", EntityKind::Coin, Vec2::new(1.0, 2.0));
        let value = serde_json::to_value(&object).expect("value");
        assert_eq!(
            value,
            json!({"id": "c1", "type": "coin", "position": {"x": 1.0, "y": 2.0}})
        );
    }

    #[test]
    fn property_accessors_ignore_wrong_types() {
        let mut object = LevelObject::new("d", EntityKind::Door, Vec2::ZERO);
        object.properties.insert("locked".to_string(), json!(true));
        object.properties.insert("value".to_string(), json!("five"));
        assert_eq!(object.property_bool("locked"), Some(true));
        assert_eq!(object.property_f32("value"), None);
        assert_eq!(object.property_str("value"), Some("five"));
    }

    #[test]
    fn singleton_kinds_are_player_and_door() {
        let singletons: Vec<EntityKind> = EntityKind::ALL
            .into_iter()
            .filter(|kind| kind.is_singleton())
            .collect();
        assert_eq!(singletons, vec![EntityKind::Player, EntityKind::Door]);
    }
}
