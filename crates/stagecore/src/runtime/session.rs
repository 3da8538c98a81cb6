use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::grid::{Size, Vec2};
use crate::level::{
    expand_template, parse_level_json, validate_document, EntityKind, LevelDocument, LevelError,
    LevelObject, MovementPattern, TemplateLibrary,
};

use super::effects::{apply_effect, EffectQueue};
use super::entity::{Entity, EntityId, EntitySpawn, KindState, Patrol, Visual, DEAD_ALPHA};
use super::history::{CollisionEvent, CollisionHistory};
use super::lifecycle::{CoinState, DoorState, EnemyState, PlayerState};
use super::registry::EntityRegistry;
use super::response::{CollisionDispatcher, DispatchContext, Resolution, ResponseHooks};

/// Turns a document into runtime spawn descriptions. The document is
/// validated up front, so either every object spawns or none do.
pub fn load_entities(
    document: &LevelDocument,
    config: &CoreConfig,
    templates: &TemplateLibrary,
) -> Result<Vec<EntitySpawn>, LevelError> {
    validate_document(document)?;
    Ok(document
        .objects
        .iter()
        .map(|object| spawn_from_object(&expand_template(object, templates), config))
        .collect())
}

fn spawn_from_object(object: &LevelObject, config: &CoreConfig) -> EntitySpawn {
    let kind = object.kind;
    let base = config.size_for(kind);
    let scale = object.scale.unwrap_or(Vec2::ONE);
    let size = Size::new(base.w * scale.x.abs(), base.h * scale.y.abs());

    let can_collide = object
        .physics
        .as_ref()
        .and_then(|physics| physics.is_collidable)
        .unwrap_or_else(|| kind.collides_by_default());

    let visual_spec = object.visual.clone().unwrap_or_default();
    let mut visual = Visual::new(
        visual_spec.texture.or_else(|| Some(kind.as_str().to_string())),
        visual_spec.tint.unwrap_or(config.default_tint),
    );
    visual.alpha = visual_spec.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
    visual.visible = object.visible.unwrap_or(true);

    let state = state_from_properties(object, config);
    let spawned_dead = match &state {
        KindState::Player(player) => !player.is_alive(),
        KindState::Enemy(enemy) => !enemy.is_alive(),
        _ => false,
    };
    if spawned_dead {
        visual.alpha = DEAD_ALPHA;
    }

    let mut spawn = EntitySpawn::new(kind, object.position, config)
        .with_source_id(object.id.clone())
        .with_size(size)
        .with_collision(can_collide)
        .with_state(state);
    spawn.visual = visual;

    if kind == EntityKind::Enemy {
        if let Some(patrol) = patrol_from_object(object, spawn.size, config) {
            spawn = spawn.with_patrol(patrol);
        }
    }
    spawn
}

fn state_from_properties(object: &LevelObject, config: &CoreConfig) -> KindState {
    match object.kind {
        EntityKind::Player => KindState::Player(PlayerState::new(
            property_u32(object, "health").unwrap_or(config.player_max_health),
        )),
        EntityKind::Enemy => KindState::Enemy(EnemyState::new(
            property_u32(object, "health").unwrap_or(config.enemy_max_health),
        )),
        EntityKind::Door => {
            let locked = object.property_bool("locked").unwrap_or(false);
            let mut door = DoorState::new(locked);
            if object.property_bool("open").unwrap_or(!locked) {
                door.open();
            }
            KindState::Door(door)
        }
        EntityKind::Coin => KindState::Coin(CoinState::new(
            property_u32(object, "value").unwrap_or(config.coin_value),
        )),
        kind => KindState::for_kind(kind, config),
    }
}

fn patrol_from_object(object: &LevelObject, size: Size, config: &CoreConfig) -> Option<Patrol> {
    let behavior = object.behavior.as_ref()?;
    if behavior.movement_pattern != Some(MovementPattern::Patrol) {
        return None;
    }
    let speed = behavior.speed.filter(|speed| speed.is_finite() && *speed > 0.0)?;
    let distance = object
        .property_f32("patrolDistance")
        .unwrap_or(config.default_patrol_distance);
    let origin_x = object.position.x - size.w * 0.5;
    Some(Patrol::new(origin_x, distance, speed))
}

fn property_u32(object: &LevelObject, name: &str) -> Option<u32> {
    object
        .property_f32(name)
        .filter(|value| *value >= 0.0)
        .map(|value| value.round() as u32)
}

/// One live playthrough of a level. Owns the registry, the deferred effect
/// queue and the collision history; dropping or tearing it down releases
/// all of them.
#[derive(Debug)]
pub struct PlaySession {
    config: CoreConfig,
    name: String,
    gravity: Vec2,
    registry: EntityRegistry,
    dispatcher: CollisionDispatcher,
    history: CollisionHistory,
    effects: EffectQueue,
    player: Option<EntityId>,
    elapsed: f64,
    tick_count: u64,
    level_complete: bool,
}

impl PlaySession {
    pub fn load(
        document: &LevelDocument,
        config: CoreConfig,
        templates: &TemplateLibrary,
    ) -> Result<Self, LevelError> {
        let spawns = load_entities(document, &config, templates)?;
        let mut registry = EntityRegistry::new();
        for spawn in spawns {
            registry.add(spawn);
        }
        let player = registry.first_of_kind(EntityKind::Player);
        info!(
            name = %document.name,
            entities = registry.len(),
            has_player = player.is_some(),
            "level_loaded"
        );

        Ok(Self {
            name: document.name.clone(),
            gravity: document.settings.gravity_or(config.default_gravity),
            history: CollisionHistory::new(config.history_capacity),
            config,
            registry,
            dispatcher: CollisionDispatcher::default(),
            effects: EffectQueue::new(),
            player,
            elapsed: 0.0,
            tick_count: 0,
            level_complete: false,
        })
    }

    /// Parses current or legacy level JSON and loads it.
    pub fn from_json_str(
        raw: &str,
        config: CoreConfig,
        templates: &TemplateLibrary,
    ) -> Result<Self, LevelError> {
        let document = parse_level_json(raw, &config)?;
        Self::load(&document, config, templates)
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn ResponseHooks>) {
        self.dispatcher.set_hooks(hooks);
    }

    /// Advances the simulation by `dt` seconds. Negative or non-finite steps
    /// are treated as zero.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += f64::from(dt);
        self.tick_count = self.tick_count.saturating_add(1);

        let pairs = self.registry.update(dt);
        let mut ctx = DispatchContext {
            registry: &mut self.registry,
            effects: &mut self.effects,
            history: &mut self.history,
            config: &self.config,
            now: self.elapsed,
            tick: self.tick_count,
        };
        for pair in pairs {
            if let Some(Resolution::DoorEntered) = self.dispatcher.dispatch(pair, &mut ctx) {
                if !self.level_complete {
                    debug!(tick = self.tick_count, "level_complete");
                }
                self.level_complete = true;
            }
        }

        for effect in self.effects.drain_due(self.elapsed) {
            apply_effect(&effect, &mut self.registry);
        }
        self.registry.compact();
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.registry.get(id))
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        self.player().and_then(Entity::player)
    }

    /// Revives the player centered on `(x, y)`.
    pub fn respawn_player(&mut self, x: f32, y: f32) -> bool {
        let Some(id) = self.player else {
            return false;
        };
        match self.registry.get_mut(id) {
            Some(entity) => entity.respawn(x, y),
            None => false,
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &CollisionHistory {
        &self.history
    }

    pub fn recent_events(&self, n: usize) -> Vec<&CollisionEvent> {
        self.history.recent_events(n)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn level_complete(&self) -> bool {
        self.level_complete
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn pending_effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Drops outstanding effects unapplied and destroys every entity.
    pub fn teardown(&mut self) {
        let cancelled = self.effects.cancel_all();
        let entities = self.registry.len();
        self.registry.clear();
        self.player = None;
        info!(
            name = %self.name,
            entities,
            cancelled_effects = cancelled,
            ticks = self.tick_count,
            "session_teardown"
        );
    }
}
