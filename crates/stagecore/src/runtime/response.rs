use tracing::{debug, trace};

use crate::config::CoreConfig;
use crate::grid::Vec2;
use crate::level::EntityKind;

use super::collision::Side;
use super::effects::{EffectAction, EffectQueue};
use super::entity::{Entity, KindState, DEAD_ALPHA};
use super::history::{CollisionEvent, CollisionHistory};
use super::registry::{CollisionPair, EntityRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCategory {
    Damage,
    Collect,
    Bounce,
    Block,
    Trigger,
}

impl CollisionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Collect => "collect",
            Self::Bounce => "bounce",
            Self::Block => "block",
            Self::Trigger => "trigger",
        }
    }
}

/// Pairs without a player are always triggers. With a player, the other
/// side's kind decides.
pub fn classify(a: EntityKind, b: EntityKind) -> CollisionCategory {
    let other = match (a, b) {
        (EntityKind::Player, other) | (other, EntityKind::Player) => other,
        _ => return CollisionCategory::Trigger,
    };
    match other {
        EntityKind::Spike | EntityKind::Enemy => CollisionCategory::Damage,
        EntityKind::Coin => CollisionCategory::Collect,
        EntityKind::Spring => CollisionCategory::Bounce,
        EntityKind::Platform | EntityKind::Door => CollisionCategory::Block,
        EntityKind::Player
        | EntityKind::Goal
        | EntityKind::Obstacle
        | EntityKind::Trigger
        | EntityKind::Decoration
        | EntityKind::Unknown => CollisionCategory::Trigger,
    }
}

/// Extension points a host can plug into the dispatcher.
pub trait ResponseHooks {
    fn on_trigger(&mut self, _event: &CollisionEvent) {}

    fn on_screen_shake(&mut self, _intensity: f32) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ResponseHooks for NoopHooks {}

/// Outcome of resolving one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Damaged { player_died: bool },
    Stomped { enemy_died: bool },
    Collected { value: u32 },
    Bounced,
    Separated { distance: f32 },
    DoorEntered,
    Triggered,
    /// Category matched but state made it a no-op (already collected,
    /// invulnerable, spring cooling, dead enemy).
    Ignored,
}

/// Mutable session state a dispatch may touch.
pub(crate) struct DispatchContext<'a> {
    pub registry: &'a mut EntityRegistry,
    pub effects: &'a mut EffectQueue,
    pub history: &'a mut CollisionHistory,
    pub config: &'a CoreConfig,
    pub now: f64,
    pub tick: u64,
}

/// The parts of a dispatch context resolvers need once the pair itself is
/// borrowed out of the registry.
struct Feedback<'a> {
    effects: &'a mut EffectQueue,
    config: &'a CoreConfig,
    now: f64,
}

impl Feedback<'_> {
    fn after(&self, seconds: f32) -> f64 {
        self.now + f64::from(seconds)
    }
}

pub struct CollisionDispatcher {
    hooks: Box<dyn ResponseHooks>,
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new(Box::new(NoopHooks))
    }
}

impl std::fmt::Debug for CollisionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionDispatcher").finish_non_exhaustive()
    }
}

impl CollisionDispatcher {
    pub fn new(hooks: Box<dyn ResponseHooks>) -> Self {
        Self { hooks }
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn ResponseHooks>) {
        self.hooks = hooks;
    }

    /// Resolves one pair and records it in history. Pairs whose entities
    /// were removed earlier in the tick resolve to `None`.
    pub(crate) fn dispatch(
        &mut self,
        pair: CollisionPair,
        ctx: &mut DispatchContext<'_>,
    ) -> Option<Resolution> {
        let (first, second) = ctx.registry.pair_mut(pair.a, pair.b)?;
        let category = classify(first.kind, second.kind);
        let event = CollisionEvent {
            entity_a: pair.a,
            entity_b: pair.b,
            kind_a: first.kind,
            kind_b: second.kind,
            category,
            side: pair.side,
            timestamp: ctx.now,
            tick: ctx.tick,
        };

        // Resolve from the player's point of view when there is one.
        let (player, other, side) = if second.kind == EntityKind::Player
            && first.kind != EntityKind::Player
        {
            (second, first, pair.side.opposite())
        } else {
            (first, second, pair.side)
        };

        let mut feedback = Feedback {
            effects: &mut *ctx.effects,
            config: ctx.config,
            now: ctx.now,
        };
        let resolution = match category {
            CollisionCategory::Damage => self.resolve_damage(player, other, side, &mut feedback),
            CollisionCategory::Collect => resolve_collect(player, other, &mut feedback),
            CollisionCategory::Bounce => resolve_bounce(other, ctx.config),
            CollisionCategory::Block => resolve_block(player, other, side),
            CollisionCategory::Trigger => {
                self.hooks.on_trigger(&event);
                Resolution::Triggered
            }
        };

        trace!(
            a = pair.a.0,
            b = pair.b.0,
            category = category.as_str(),
            side = pair.side.as_str(),
            ?resolution,
            "collision_dispatched"
        );
        ctx.history.push(event);
        Some(resolution)
    }

    fn resolve_damage(
        &mut self,
        player: &mut Entity,
        other: &mut Entity,
        side: Side,
        feedback: &mut Feedback<'_>,
    ) -> Resolution {
        let config = feedback.config;
        let KindState::Player(player_state) = &mut player.state else {
            return Resolution::Ignored;
        };
        if !player_state.is_alive() {
            return Resolution::Ignored;
        }

        let resolution = match &mut other.state {
            KindState::Enemy(enemy) if !enemy.is_alive() => return Resolution::Ignored,
            KindState::Enemy(enemy) if side == Side::Bottom => {
                let enemy_died = enemy.take_damage(config.stomp_damage);
                if enemy_died {
                    other.visual.alpha = DEAD_ALPHA;
                    debug!(enemy = other.id.0, "enemy_died");
                }
                Resolution::Stomped { enemy_died }
            }
            _ => {
                if player_state.is_invulnerable() {
                    return Resolution::Ignored;
                }
                let player_died = player_state
                    .take_damage(config.contact_damage, config.player_invulnerability_seconds);
                if player_died {
                    player.visual.alpha = DEAD_ALPHA;
                    debug!(player = player.id.0, source = other.kind.as_str(), "player_died");
                }
                Resolution::Damaged { player_died }
            }
        };

        let flash_until = feedback.after(config.damage_flash_seconds);
        for entity in [&mut *player, &mut *other] {
            entity.visual.tint = config.damage_flash_tint;
            feedback
                .effects
                .reschedule(flash_until, entity.id, EffectAction::ClearTint);
        }
        self.hooks.on_screen_shake(1.0);
        resolution
    }
}

fn resolve_collect(player: &mut Entity, coin: &mut Entity, feedback: &mut Feedback<'_>) -> Resolution {
    let KindState::Coin(coin_state) = &mut coin.state else {
        return Resolution::Ignored;
    };
    let Some(value) = coin_state.collect() else {
        return Resolution::Ignored;
    };
    if let KindState::Player(player_state) = &mut player.state {
        player_state.add_score(value);
    }
    let pulse = feedback.config.collect_pulse_scale;
    coin.visual.scale = Vec2::new(pulse, pulse);
    coin.visual.alpha = 0.0;
    coin.can_collide = false;
    let remove_at = feedback.after(feedback.config.coin_removal_delay_seconds);
    feedback
        .effects
        .schedule(remove_at, coin.id, EffectAction::Despawn);
    debug!(coin = coin.id.0, value, "coin_collected");
    Resolution::Collected { value }
}

fn resolve_bounce(spring: &mut Entity, config: &CoreConfig) -> Resolution {
    let KindState::Spring(spring_state) = &mut spring.state else {
        return Resolution::Ignored;
    };
    if !spring_state.activate(config.spring_cooldown_seconds) {
        return Resolution::Ignored;
    }
    spring.visual.scale.y = config.spring_squash_scale_y;
    Resolution::Bounced
}

fn resolve_block(player: &mut Entity, other: &mut Entity, side: Side) -> Resolution {
    if let Some(door) = other.door_mut() {
        if door.is_open() {
            door.enter();
            debug!(door = other.id.0, player = player.id.0, "door_entered");
            return Resolution::DoorEntered;
        }
    }
    let distance = separate(player, other, side);
    Resolution::Separated { distance }
}

/// Pushes `a` and `b` apart along the axis of `side` (the side of `a` that
/// `b` touches), each moving half the penetration depth.
fn separate(a: &mut Entity, b: &mut Entity, side: Side) -> f32 {
    let depth = a.aabb().penetration(&b.aabb(), side);
    let half = depth * 0.5;
    match side {
        Side::Right => {
            a.position.x -= half;
            b.position.x += half;
        }
        Side::Left => {
            a.position.x += half;
            b.position.x -= half;
        }
        Side::Bottom => {
            a.position.y -= half;
            b.position.y += half;
        }
        Side::Top => {
            a.position.y += half;
            b.position.y -= half;
        }
    }
    depth
}
