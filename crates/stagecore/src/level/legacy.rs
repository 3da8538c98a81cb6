use serde_json::{json, Value};
use tracing::{info, warn};

use super::document::{
    BodyType, EntityKind, LevelBounds, LevelDocument, LevelObject, LevelSettings, PhysicsSpec,
    VisualSpec, CURRENT_SCHEMA_VERSION,
};
use crate::config::CoreConfig;
use crate::grid::Vec2;

/// Gravity at or below this magnitude is a legacy normalized unit.
const LEGACY_NORMALIZED_GRAVITY_MAX: f32 = 10.0;

/// Pre-schema level layout: a world box, a single round player, and a list of
/// rectangular platforms. Fields are read leniently; anything missing or of
/// the wrong type falls back to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyLevel {
    pub world: LegacyWorld,
    pub player: LegacyPlayer,
    pub platforms: Vec<LegacyPlatform>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyWorld {
    pub width: f32,
    pub height: f32,
    pub background_color: Option<Value>,
    pub gravity: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPlayer {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPlatform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Option<Value>,
}

/// A JSON object is treated as legacy when it carries the old `world` or
/// `platforms` keys and none of the current-schema `objects`.
pub fn is_legacy(raw: &Value) -> bool {
    let Some(root) = raw.as_object() else {
        return false;
    };
    !root.contains_key("objects") && (root.contains_key("world") || root.contains_key("platforms"))
}

impl LegacyLevel {
    pub fn from_value(raw: &Value) -> Self {
        let world = raw.get("world");
        let player = raw.get("player");
        let platforms = raw
            .get("platforms")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| LegacyPlatform {
                        x: number(entry, "x"),
                        y: number(entry, "y"),
                        width: number(entry, "width"),
                        height: number(entry, "height"),
                        color: entry.get("color").cloned(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            world: LegacyWorld {
                width: world.map(|w| number(w, "width")).unwrap_or(0.0),
                height: world.map(|w| number(w, "height")).unwrap_or(0.0),
                background_color: world.and_then(|w| w.get("backgroundColor")).cloned(),
                gravity: world.and_then(|w| w.get("gravity")).and_then(legacy_gravity),
            },
            player: LegacyPlayer {
                x: player.map(|p| number(p, "x")).unwrap_or(0.0),
                y: player.map(|p| number(p, "y")).unwrap_or(0.0),
                radius: player.map(|p| number(p, "radius")).unwrap_or(0.0),
                color: player.and_then(|p| p.get("color")).cloned(),
            },
            platforms,
        }
    }
}

fn number(value: &Value, key: &str) -> f32 {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|raw| raw as f32)
        .filter(|raw| raw.is_finite())
        .unwrap_or(0.0)
}

fn legacy_gravity(raw: &Value) -> Option<Vec2> {
    if let Some(y) = raw.as_f64() {
        return Some(Vec2::new(0.0, y as f32));
    }
    let y = raw.get("y").and_then(Value::as_f64)?;
    let x = raw.get("x").and_then(Value::as_f64).unwrap_or(0.0);
    Some(Vec2::new(x as f32, y as f32))
}

/// Parses `#RRGGBB`, `0xRRGGBB`, bare `RRGGBB`, or a numeric color.
pub fn parse_color(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(number) => number
            .as_u64()
            .filter(|value| *value <= 0xFF_FFFF)
            .map(|value| value as u32),
        Value::String(text) => {
            let trimmed = text.trim();
            let hex = trimmed
                .strip_prefix('#')
                .or_else(|| trimmed.strip_prefix("0x"))
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);
            if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
                return None;
            }
            u32::from_str_radix(hex, 16).ok()
        }
        _ => None,
    }
}

fn tint_or_default(raw: Option<&Value>, config: &CoreConfig, owner: &str) -> u32 {
    match raw {
        None => config.default_tint,
        Some(value) => parse_color(value).unwrap_or_else(|| {
            warn!(owner, color = %value, "legacy_color_unparseable_using_default_tint");
            config.default_tint
        }),
    }
}

fn normalize_gravity(gravity: Option<Vec2>, config: &CoreConfig) -> Vec2 {
    match gravity {
        None => config.default_gravity,
        Some(gravity) if gravity.y <= LEGACY_NORMALIZED_GRAVITY_MAX => Vec2 {
            x: gravity.x,
            y: config.legacy_gravity_y,
        },
        Some(gravity) => gravity,
    }
}

fn ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        1.0
    }
}

/// Converts a legacy level into the current schema. Never fails.
pub fn convert_legacy(legacy: &LegacyLevel, config: &CoreConfig) -> LevelDocument {
    let mut objects = Vec::with_capacity(legacy.platforms.len() + 1);

    let mut player = LevelObject::new(
        "player",
        EntityKind::Player,
        Vec2::new(legacy.player.x, legacy.player.y),
    );
    if legacy.player.radius > 0.0 {
        let diameter = legacy.player.radius * 2.0;
        let size = config.size_for(EntityKind::Player);
        player.scale = Some(Vec2::new(ratio(diameter, size.w), ratio(diameter, size.h)));
        player
            .properties
            .insert("radius".to_string(), json!(legacy.player.radius));
    }
    player.visual = Some(VisualSpec {
        tint: Some(tint_or_default(
            legacy.player.color.as_ref(),
            config,
            "player",
        )),
        ..VisualSpec::default()
    });
    objects.push(player);

    for (index, platform) in legacy.platforms.iter().enumerate() {
        let id = format!("platform_{index}");
        let mut object = LevelObject::new(
            id.clone(),
            EntityKind::Platform,
            Vec2::new(platform.x, platform.y),
        );
        object.scale = Some(Vec2::new(
            ratio(platform.width, config.tile_width),
            ratio(platform.height, config.tile_height),
        ));
        object.physics = Some(PhysicsSpec {
            body: Some(BodyType::Static),
            is_collidable: Some(true),
            ..PhysicsSpec::default()
        });
        object.visual = Some(VisualSpec {
            tint: Some(tint_or_default(platform.color.as_ref(), config, &id)),
            ..VisualSpec::default()
        });
        objects.push(object);
    }

    let bounds = (legacy.world.width > 0.0 && legacy.world.height > 0.0).then(|| LevelBounds {
        width: legacy.world.width.round() as u32,
        height: legacy.world.height.round() as u32,
    });
    let background_color = legacy
        .world
        .background_color
        .as_ref()
        .and_then(parse_color)
        .map(|color| format!("#{color:06x}"));

    info!(
        platforms = legacy.platforms.len(),
        objects = objects.len(),
        "legacy_level_converted"
    );

    LevelDocument {
        version: CURRENT_SCHEMA_VERSION.to_string(),
        name: "Converted Level".to_string(),
        description: Some("Converted from the legacy level format".to_string()),
        settings: LevelSettings {
            gravity: Some(normalize_gravity(legacy.world.gravity, config)),
            background_color,
            bounds,
            music: None,
            ambient_light: None,
        },
        objects,
    }
}

/// Convenience for callers holding raw JSON.
pub fn convert_legacy_value(raw: &Value, config: &CoreConfig) -> LevelDocument {
    convert_legacy(&LegacyLevel::from_value(raw), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_legacy() -> Value {
        json!({
            "world": {"width": 800, "height": 600, "backgroundColor": "#87CEEB"},
            "player": {"x": 100, "y": 450, "radius": 16, "color": "#ff0000"},
            "platforms": [
                {"x": 400, "y": 580, "width": 800, "height": 40, "color": "#228B22"},
                {"x": 200, "y": 400, "width": 64, "height": 32, "color": "not-a-color"}
            ]
        })
    }

    #[test]
    fn converts_to_one_player_and_one_platform_per_entry() {
        let config = CoreConfig::default();
        let doc = convert_legacy_value(&sample_legacy(), &config);

        assert_eq!(doc.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(doc.objects.len(), 3);
        assert_eq!(doc.objects[0].kind, EntityKind::Player);
        assert_eq!(doc.objects[1].kind, EntityKind::Platform);
        assert_eq!(doc.objects[2].kind, EntityKind::Platform);
        assert_eq!(
            doc.settings.bounds,
            Some(LevelBounds {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn platform_scale_is_pixel_size_over_tile_size() {
        let config = CoreConfig::default();
        let doc = convert_legacy_value(&sample_legacy(), &config);

        assert_eq!(doc.objects[1].scale, Some(Vec2::new(800.0 / 32.0, 40.0 / 32.0)));
        assert_eq!(doc.objects[2].scale, Some(Vec2::new(2.0, 1.0)));
    }

    #[test]
    fn malformed_color_falls_back_to_default_tint() {
        let mut config = CoreConfig::default();
        config.default_tint = 0x123456;
        let doc = convert_legacy_value(&sample_legacy(), &config);

        let tint = |index: usize| doc.objects[index].visual.as_ref().and_then(|v| v.tint);
        assert_eq!(tint(0), Some(0xFF0000));
        assert_eq!(tint(1), Some(0x228B22));
        assert_eq!(tint(2), Some(0x123456));
        assert_eq!(doc.settings.background_color.as_deref(), Some("#87ceeb"));
    }

    #[test]
    fn normalized_gravity_is_replaced_and_pixel_gravity_passes_through() {
        let config = CoreConfig::default();

        let mut legacy = LegacyLevel::from_value(&sample_legacy());
        legacy.world.gravity = Some(Vec2::new(0.0, 1.0));
        assert_eq!(
            convert_legacy(&legacy, &config).settings.gravity,
            Some(Vec2::new(0.0, config.legacy_gravity_y))
        );

        legacy.world.gravity = Some(Vec2::new(0.0, 10.0));
        assert_eq!(
            convert_legacy(&legacy, &config).settings.gravity.map(|g| g.y),
            Some(config.legacy_gravity_y)
        );

        legacy.world.gravity = Some(Vec2::new(0.0, 980.0));
        assert_eq!(
            convert_legacy(&legacy, &config).settings.gravity.map(|g| g.y),
            Some(980.0)
        );

        legacy.world.gravity = None;
        assert_eq!(
            convert_legacy(&legacy, &config).settings.gravity,
            Some(config.default_gravity)
        );
    }

    #[test]
    fn gravity_accepts_number_or_vector() {
        let number = LegacyLevel::from_value(&json!({"world": {"gravity": 0.5}}));
        assert_eq!(number.world.gravity, Some(Vec2::new(0.0, 0.5)));
        let vector = LegacyLevel::from_value(&json!({"world": {"gravity": {"x": 1, "y": 900}}}));
        assert_eq!(vector.world.gravity, Some(Vec2::new(1.0, 900.0)));
    }

    #[test]
    fn garbage_input_still_converts() {
        let config = CoreConfig::default();
        let doc = convert_legacy_value(
            &json!({"world": "nope", "player": 7, "platforms": [{"x": "a"}]}),
            &config,
        );
        assert_eq!(doc.objects.len(), 2);
        assert_eq!(doc.objects[0].position, Vec2::ZERO);
        assert_eq!(doc.settings.bounds, None);
        // the runtime replaces a zero scale with the kind's default size
        assert_eq!(doc.objects[1].scale, Some(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn player_radius_becomes_scale_and_property() {
        let config = CoreConfig::default();
        let doc = convert_legacy_value(&sample_legacy(), &config);
        let player = &doc.objects[0];
        let size = config.size_for(EntityKind::Player);
        assert_eq!(player.property_f32("radius"), Some(16.0));
        assert_eq!(player.scale, Some(Vec2::new(32.0 / size.w, 32.0 / size.h)));
    }

    #[test]
    fn legacy_detection_requires_absent_objects() {
        assert!(is_legacy(&sample_legacy()));
        assert!(!is_legacy(&json!({"version": "1.0.0", "objects": []})));
        assert!(!is_legacy(&json!({"world": {}, "objects": []})));
        assert!(!is_legacy(&json!("world")));
    }

    #[test]
    fn parse_color_variants() {
        assert_eq!(parse_color(&json!("#00ff00")), Some(0x00FF00));
        assert_eq!(parse_color(&json!("0xABCDEF")), Some(0xABCDEF));
        assert_eq!(parse_color(&json!("abcdef")), Some(0xABCDEF));
        assert_eq!(parse_color(&json!(255)), Some(255));
        assert_eq!(parse_color(&json!("#fff")), None);
        assert_eq!(parse_color(&json!("#gggggg")), None);
        assert_eq!(parse_color(&json!(-1)), None);
        assert_eq!(parse_color(&json!(true)), None);
    }
}
