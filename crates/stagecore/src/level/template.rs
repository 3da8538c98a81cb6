use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::document::{
    BehaviorSpec, BodyType, EntityKind, LevelObject, MovementPattern, PhysicsSpec, VisualSpec,
};

/// Property an object can set to pick a template other than its kind's.
pub const TEMPLATE_PROPERTY: &str = "template";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    #[serde(default)]
    pub physics: Option<PhysicsSpec>,
    #[serde(default)]
    pub visual: Option<VisualSpec>,
    #[serde(default)]
    pub behavior: Option<BehaviorSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateLibrary {
    templates: HashMap<String, ObjectTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// One template per kind, named after the kind's schema string.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for kind in EntityKind::ALL {
            library.insert(kind.as_str(), builtin_template(kind));
        }
        library
    }

    pub fn insert(&mut self, name: impl Into<String>, template: ObjectTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&ObjectTemplate> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_template(kind: EntityKind) -> ObjectTemplate {
    let body = match kind {
        EntityKind::Player | EntityKind::Enemy => BodyType::Dynamic,
        EntityKind::Decoration => BodyType::None,
        _ => BodyType::Static,
    };
    let behavior = match kind {
        EntityKind::Enemy => Some(BehaviorSpec {
            movement_pattern: Some(MovementPattern::Patrol),
            speed: Some(60.0),
            ..BehaviorSpec::default()
        }),
        _ => None,
    };
    ObjectTemplate {
        physics: Some(PhysicsSpec {
            body: Some(body),
            is_collidable: Some(kind.collides_by_default()),
            gravity_scale: Some(if body == BodyType::Dynamic { 1.0 } else { 0.0 }),
            friction: Some(0.1),
            restitution: Some(if kind == EntityKind::Spring { 1.0 } else { 0.0 }),
            density: Some(1.0),
        }),
        visual: Some(VisualSpec {
            texture: Some(kind.as_str().to_string()),
            frame: None,
            tint: None,
            alpha: Some(1.0),
        }),
        behavior,
    }
}

/// Layers an object's own fields over its template. Instance values always
/// win; the physics body type resolves instance, then template, then `none`.
pub fn expand_template(object: &LevelObject, templates: &TemplateLibrary) -> LevelObject {
    let template_name = object
        .property_str(TEMPLATE_PROPERTY)
        .unwrap_or(object.kind.as_str());
    let Some(template) = templates.get(template_name) else {
        return object.clone();
    };

    let mut expanded = object.clone();
    expanded.physics = merge_physics(object.physics.as_ref(), template.physics.as_ref());
    expanded.visual = merge_visual(object.visual.as_ref(), template.visual.as_ref());
    expanded.behavior = merge_behavior(object.behavior.as_ref(), template.behavior.as_ref());
    expanded
}

fn merge_physics(
    instance: Option<&PhysicsSpec>,
    template: Option<&PhysicsSpec>,
) -> Option<PhysicsSpec> {
    match (instance, template) {
        (None, None) => None,
        (Some(spec), None) | (None, Some(spec)) => Some(PhysicsSpec {
            body: Some(spec.body.unwrap_or(BodyType::None)),
            ..spec.clone()
        }),
        (Some(own), Some(base)) => Some(PhysicsSpec {
            body: Some(own.body.or(base.body).unwrap_or(BodyType::None)),
            is_collidable: own.is_collidable.or(base.is_collidable),
            gravity_scale: own.gravity_scale.or(base.gravity_scale),
            friction: own.friction.or(base.friction),
            restitution: own.restitution.or(base.restitution),
            density: own.density.or(base.density),
        }),
    }
}

fn merge_visual(instance: Option<&VisualSpec>, template: Option<&VisualSpec>) -> Option<VisualSpec> {
    match (instance, template) {
        (None, None) => None,
        (Some(spec), None) | (None, Some(spec)) => Some(spec.clone()),
        (Some(own), Some(base)) => Some(VisualSpec {
            texture: own.texture.clone().or_else(|| base.texture.clone()),
            frame: own.frame.clone().or_else(|| base.frame.clone()),
            tint: own.tint.or(base.tint),
            alpha: own.alpha.or(base.alpha),
        }),
    }
}

fn merge_behavior(
    instance: Option<&BehaviorSpec>,
    template: Option<&BehaviorSpec>,
) -> Option<BehaviorSpec> {
    match (instance, template) {
        (None, None) => None,
        (Some(spec), None) | (None, Some(spec)) => Some(spec.clone()),
        (Some(own), Some(base)) => Some(BehaviorSpec {
            movement_pattern: own.movement_pattern.or(base.movement_pattern),
            speed: own.speed.or(base.speed),
            target_id: own.target_id.clone().or_else(|| base.target_id.clone()),
            trigger_events: own
                .trigger_events
                .clone()
                .or_else(|| base.trigger_events.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Vec2;
    use serde_json::json;

    fn library_with_crate() -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library.insert(
            "crate",
            ObjectTemplate {
                physics: Some(PhysicsSpec {
                    body: Some(BodyType::Dynamic),
                    is_collidable: Some(true),
                    friction: Some(0.8),
                    ..PhysicsSpec::default()
                }),
                visual: Some(VisualSpec {
                    texture: Some("crate".to_string()),
                    alpha: Some(1.0),
                    ..VisualSpec::default()
                }),
                behavior: None,
            },
        );
        library
    }

    #[test]
    fn instance_fields_override_template_fields() {
        let mut object = LevelObject::new("box", EntityKind::Obstacle, Vec2::ZERO);
        object
            .properties
            .insert(TEMPLATE_PROPERTY.to_string(), json!("crate"));
        object.physics = Some(PhysicsSpec {
            friction: Some(0.2),
            ..PhysicsSpec::default()
        });
        object.visual = Some(VisualSpec {
            tint: Some(0xFF0000),
            ..VisualSpec::default()
        });

        let expanded = expand_template(&object, &library_with_crate());
        let physics = expanded.physics.expect("physics");
        assert_eq!(physics.friction, Some(0.2));
        assert_eq!(physics.body, Some(BodyType::Dynamic));
        assert_eq!(physics.is_collidable, Some(true));
        let visual = expanded.visual.expect("visual");
        assert_eq!(visual.texture.as_deref(), Some("crate"));
        assert_eq!(visual.tint, Some(0xFF0000));
    }

    #[test]
    fn body_type_falls_back_to_none_when_neither_side_sets_it() {
        let mut library = TemplateLibrary::new();
        library.insert(
            "coin",
            ObjectTemplate {
                physics: Some(PhysicsSpec {
                    is_collidable: Some(true),
                    ..PhysicsSpec::default()
                }),
                ..ObjectTemplate::default()
            },
        );
        let object = LevelObject::new("c", EntityKind::Coin, Vec2::ZERO);
        let expanded = expand_template(&object, &library);
        assert_eq!(expanded.physics.expect("physics").body, Some(BodyType::None));
    }

    #[test]
    fn instance_body_type_beats_template() {
        let mut object = LevelObject::new("p", EntityKind::Platform, Vec2::ZERO);
        object.physics = Some(PhysicsSpec {
            body: Some(BodyType::Kinematic),
            ..PhysicsSpec::default()
        });
        let expanded = expand_template(&object, &TemplateLibrary::builtin());
        assert_eq!(
            expanded.physics.expect("physics").body,
            Some(BodyType::Kinematic)
        );
    }

    #[test]
    fn kind_name_selects_template_when_no_property_given() {
        let object = LevelObject::new("e", EntityKind::Enemy, Vec2::ZERO);
        let expanded = expand_template(&object, &TemplateLibrary::builtin());
        assert_eq!(
            expanded.behavior.expect("behavior").movement_pattern,
            Some(MovementPattern::Patrol)
        );
        assert_eq!(
            expanded.physics.expect("physics").body,
            Some(BodyType::Dynamic)
        );
    }

    #[test]
    fn missing_template_leaves_object_untouched() {
        let mut object = LevelObject::new("x", EntityKind::Goal, Vec2::new(3.0, 4.0));
        object
            .properties
            .insert(TEMPLATE_PROPERTY.to_string(), json!("does_not_exist"));
        let expanded = expand_template(&object, &TemplateLibrary::builtin());
        assert_eq!(expanded, object);
    }

    #[test]
    fn decoration_template_is_not_collidable() {
        let library = TemplateLibrary::builtin();
        let physics = library
            .get("decoration")
            .and_then(|template| template.physics.clone())
            .expect("physics");
        assert_eq!(physics.is_collidable, Some(false));
        assert_eq!(physics.body, Some(BodyType::None));
        assert_eq!(library.len(), EntityKind::ALL.len());
    }
}
