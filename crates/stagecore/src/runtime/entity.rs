use crate::config::CoreConfig;
use crate::grid::{Size, Vec2};
use crate::level::EntityKind;

use super::collision::{Aabb, Side};
use super::lifecycle::{CoinState, DoorState, EnemyState, PlayerState, SpringState};

/// Alpha applied to dead players and enemies.
pub const DEAD_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub texture: Option<String>,
    pub base_tint: u32,
    pub tint: u32,
    pub alpha: f32,
    pub scale: Vec2,
    pub visible: bool,
}

impl Visual {
    pub fn new(texture: Option<String>, tint: u32) -> Self {
        Self {
            texture,
            base_tint: tint,
            tint,
            alpha: 1.0,
            scale: Vec2::ONE,
            visible: true,
        }
    }

    pub fn clear_tint(&mut self) {
        self.tint = self.base_tint;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindState {
    Player(PlayerState),
    Enemy(EnemyState),
    Door(DoorState),
    Spring(SpringState),
    Coin(CoinState),
    Inert,
}

impl KindState {
    pub fn for_kind(kind: EntityKind, config: &CoreConfig) -> Self {
        match kind {
            EntityKind::Player => Self::Player(PlayerState::new(config.player_max_health)),
            EntityKind::Enemy => Self::Enemy(EnemyState::new(config.enemy_max_health)),
            EntityKind::Door => Self::Door(DoorState::default()),
            EntityKind::Spring => Self::Spring(SpringState::default()),
            EntityKind::Coin => Self::Coin(CoinState::new(config.coin_value)),
            EntityKind::Platform
            | EntityKind::Goal
            | EntityKind::Obstacle
            | EntityKind::Trigger
            | EntityKind::Decoration
            | EntityKind::Spike
            | EntityKind::Unknown => Self::Inert,
        }
    }
}

/// Horizontal back-and-forth movement around the spawn x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    pub origin_x: f32,
    pub distance: f32,
    pub speed: f32,
    pub direction: f32,
}

impl Patrol {
    pub fn new(origin_x: f32, distance: f32, speed: f32) -> Self {
        Self {
            origin_x,
            distance: distance.max(0.0),
            speed: speed.abs(),
            direction: 1.0,
        }
    }

    fn step(&mut self, x: f32, dt: f32) -> f32 {
        let next = x + self.speed * self.direction * dt;
        let min = self.origin_x - self.distance;
        let max = self.origin_x + self.distance;
        if next >= max {
            self.direction = -1.0;
            max
        } else if next <= min {
            self.direction = 1.0;
            min
        } else {
            next
        }
    }
}

/// What an entity last touched, recorded by its collision hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub other: EntityId,
    pub other_kind: EntityKind,
    pub side: Side,
}

/// Everything needed to add an entity to a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpawn {
    pub source_id: String,
    pub kind: EntityKind,
    pub center: Vec2,
    pub size: Size,
    pub collision_offset: Vec2,
    pub can_collide: bool,
    pub visual: Visual,
    pub state: KindState,
    pub patrol: Option<Patrol>,
}

impl EntitySpawn {
    /// Kind defaults from `config`, centered on `center`.
    pub fn new(kind: EntityKind, center: Vec2, config: &CoreConfig) -> Self {
        Self {
            source_id: String::new(),
            kind,
            center,
            size: config.size_for(kind),
            collision_offset: Vec2::ZERO,
            can_collide: kind.collides_by_default(),
            visual: Visual::new(Some(kind.as_str().to_string()), config.default_tint),
            state: KindState::for_kind(kind, config),
            patrol: None,
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Non-positive sizes are ignored so every AABB keeps positive extents.
    pub fn with_size(mut self, size: Size) -> Self {
        if size.is_positive() {
            self.size = size;
        }
        self
    }

    pub fn with_state(mut self, state: KindState) -> Self {
        self.state = state;
        self
    }

    pub fn with_collision(mut self, can_collide: bool) -> Self {
        self.can_collide = can_collide;
        self
    }

    pub fn with_patrol(mut self, patrol: Patrol) -> Self {
        self.patrol = Some(patrol);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub source_id: String,
    pub kind: EntityKind,
    /// Top-left corner in runtime pixels.
    pub position: Vec2,
    pub size: Size,
    pub collision_offset: Vec2,
    pub active: bool,
    pub can_collide: bool,
    pub visual: Visual,
    pub state: KindState,
    pub patrol: Option<Patrol>,
    pub last_contact: Option<Contact>,
    pub(crate) tombstoned: bool,
}

impl Entity {
    pub(crate) fn from_spawn(id: EntityId, spawn: EntitySpawn) -> Self {
        let position = Vec2 {
            x: spawn.center.x - spawn.size.w * 0.5,
            y: spawn.center.y - spawn.size.h * 0.5,
        };
        Self {
            id,
            source_id: spawn.source_id,
            kind: spawn.kind,
            position,
            size: spawn.size,
            collision_offset: spawn.collision_offset,
            active: true,
            can_collide: spawn.can_collide,
            visual: spawn.visual,
            state: spawn.state,
            patrol: spawn.patrol,
            last_contact: None,
            tombstoned: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.position.x + self.collision_offset.x,
            self.position.y + self.collision_offset.y,
            self.size.w,
            self.size.h,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.position.x + self.size.w * 0.5,
            y: self.position.y + self.size.h * 0.5,
        }
    }

    pub fn participates_in_collision(&self) -> bool {
        self.active && self.can_collide && !self.tombstoned
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.state {
            KindState::Player(state) => Some(state),
            _ => None,
        }
    }

    pub fn door(&self) -> Option<&DoorState> {
        match &self.state {
            KindState::Door(state) => Some(state),
            _ => None,
        }
    }

    pub fn door_mut(&mut self) -> Option<&mut DoorState> {
        match &mut self.state {
            KindState::Door(state) => Some(state),
            _ => None,
        }
    }

    pub fn spring(&self) -> Option<&SpringState> {
        match &self.state {
            KindState::Spring(state) => Some(state),
            _ => None,
        }
    }

    pub fn coin(&self) -> Option<&CoinState> {
        match &self.state {
            KindState::Coin(state) => Some(state),
            _ => None,
        }
    }

    pub fn enemy(&self) -> Option<&EnemyState> {
        match &self.state {
            KindState::Enemy(state) => Some(state),
            _ => None,
        }
    }

    /// Per-tick hook: timers, spring recovery and enemy patrol.
    pub(crate) fn update(&mut self, dt: f32) {
        match &mut self.state {
            KindState::Player(player) => player.tick(dt),
            KindState::Spring(spring) => {
                spring.tick(dt);
                if spring.is_ready() {
                    self.visual.scale = Vec2::ONE;
                }
            }
            KindState::Enemy(enemy) => {
                if !enemy.is_alive() {
                    return;
                }
                if let Some(patrol) = self.patrol.as_mut() {
                    self.position.x = patrol.step(self.position.x, dt);
                }
            }
            KindState::Door(_) | KindState::Coin(_) | KindState::Inert => {}
        }
    }

    /// Informational only; responses are resolved by the dispatcher.
    pub(crate) fn on_collision(&mut self, contact: Contact) {
        if let KindState::Enemy(enemy) = &self.state {
            if !enemy.is_alive() {
                return;
            }
        }
        self.last_contact = Some(contact);
    }

    /// Revives a player centered on `(x, y)`. Other kinds are left alone.
    pub fn respawn(&mut self, x: f32, y: f32) -> bool {
        let KindState::Player(player) = &mut self.state else {
            return false;
        };
        player.revive();
        let alive = player.is_alive();
        self.position = Vec2 {
            x: x - self.size.w * 0.5,
            y: y - self.size.h * 0.5,
        };
        self.visual.alpha = if alive { 1.0 } else { DEAD_ALPHA };
        self.visual.clear_tint();
        self.last_contact = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::lifecycle::Life;

    fn entity(kind: EntityKind, center: Vec2) -> Entity {
        let config = CoreConfig::default();
        Entity::from_spawn(EntityId(1), EntitySpawn::new(kind, center, &config))
    }

    #[test]
    fn spawn_center_becomes_top_left_position() {
        let coin = entity(EntityKind::Coin, Vec2::new(100.0, 50.0));
        assert_eq!(coin.position, Vec2::new(92.0, 42.0));
        assert_eq!(coin.center(), Vec2::new(100.0, 50.0));
        assert_eq!(coin.aabb(), Aabb::new(92.0, 42.0, 16.0, 16.0));
    }

    #[test]
    fn non_positive_size_override_is_ignored() {
        let config = CoreConfig::default();
        let spawn = EntitySpawn::new(EntityKind::Platform, Vec2::ZERO, &config)
            .with_size(Size::new(0.0, 10.0));
        assert_eq!(spawn.size, Size::new(32.0, 32.0));
    }

    #[test]
    fn collision_offset_shifts_aabb() {
        let mut player = entity(EntityKind::Player, Vec2::new(14.0, 15.0));
        player.collision_offset = Vec2::new(2.0, 3.0);
        assert_eq!(player.aabb(), Aabb::new(2.0, 3.0, 28.0, 30.0));
    }

    #[test]
    fn patrol_turns_around_at_range_edges() {
        let mut enemy = entity(EntityKind::Enemy, Vec2::new(14.0, 14.0));
        enemy.patrol = Some(Patrol::new(0.0, 10.0, 8.0));

        enemy.update(1.0);
        assert_eq!(enemy.position.x, 8.0);
        enemy.update(1.0);
        assert_eq!(enemy.position.x, 10.0);
        enemy.update(1.0);
        assert_eq!(enemy.position.x, 2.0);
        enemy.update(2.0);
        assert_eq!(enemy.position.x, -10.0);
        enemy.update(1.0);
        assert_eq!(enemy.position.x, -2.0);
    }

    #[test]
    fn dead_enemy_stops_moving_and_ignores_contacts() {
        let mut enemy = entity(EntityKind::Enemy, Vec2::new(14.0, 14.0));
        enemy.patrol = Some(Patrol::new(0.0, 100.0, 10.0));
        enemy.state = KindState::Enemy(EnemyState::new(0));
        enemy.update(1.0);
        assert_eq!(enemy.position.x, 0.0);

        enemy.on_collision(Contact {
            other: EntityId(9),
            other_kind: EntityKind::Player,
            side: Side::Top,
        });
        assert!(enemy.last_contact.is_none());
    }

    #[test]
    fn spring_scale_resets_when_cooldown_elapses() {
        let mut spring = entity(EntityKind::Spring, Vec2::ZERO);
        spring.state = KindState::Spring(SpringState::Cooling { remaining: 0.5 });
        spring.visual.scale = Vec2::new(1.0, 0.6);

        spring.update(0.25);
        assert_eq!(spring.visual.scale.y, 0.6);
        spring.update(0.25);
        assert_eq!(spring.visual.scale, Vec2::ONE);
        assert!(spring.spring().expect("spring").is_ready());
    }

    #[test]
    fn squash_without_cooldown_reverts_next_update() {
        let mut spring = entity(EntityKind::Spring, Vec2::ZERO);
        if let KindState::Spring(state) = &mut spring.state {
            assert!(state.activate(0.0));
        }
        spring.visual.scale = Vec2::new(1.0, 0.6);

        spring.update(0.016);
        assert_eq!(spring.visual.scale, Vec2::ONE);
    }

    #[test]
    fn respawn_resets_player_only() {
        let mut player = entity(EntityKind::Player, Vec2::ZERO);
        if let KindState::Player(state) = &mut player.state {
            state.take_damage(1000, 0.0);
        }
        player.visual.alpha = DEAD_ALPHA;
        assert!(player.respawn(50.0, 60.0));
        let state = player.player().expect("player");
        assert_eq!(state.life, Life::Alive);
        assert_eq!(state.health, state.max_health);
        assert_eq!(player.center(), Vec2::new(50.0, 60.0));
        assert_eq!(player.visual.alpha, 1.0);

        let mut coin = entity(EntityKind::Coin, Vec2::ZERO);
        assert!(!coin.respawn(1.0, 1.0));
    }
}
